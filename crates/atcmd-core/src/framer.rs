//! Response framing.
//!
//! Every response is built into a fixed-capacity buffer as
//! `prefix + payload + postfix`, each phase selected by [`RespFlags`]. The
//! payload is truncated to whatever room is left. The postfix is only written
//! if it fits whole; it still counts towards the reported length, which is then
//! clamped to the capacity.
//!
//! ```text
//! +--------+---------------------------+---------+
//! | "\r\n" | payload (truncated)       | "\r\n"  |
//! +--------+---------------------------+---------+
//! ```

use std::fmt::{self, Write};

use bitflags::bitflags;
use bytes::{Bytes, BytesMut};

use crate::config::EngineConfig;
use crate::error::CmdError;

bitflags! {
    /// Phases of a response frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RespFlags: u8 {
        /// Write the prefix marker.
        const PREFIX = 0b001;
        /// Write the payload.
        const PAYLOAD = 0b010;
        /// Write the postfix marker.
        const POSTFIX = 0b100;
        /// Prefix, payload and postfix.
        const ALL = Self::PREFIX.bits() | Self::PAYLOAD.bits() | Self::POSTFIX.bits();
    }
}

/// A finished response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Bytes,
    truncated: bool,
}

impl Frame {
    /// The bytes handed to the channel, `len()` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reported length, clamped to the capacity.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the requested content did not fit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

/// Writes into `buf[..limit]` while counting the full requested length.
struct BoundedWriter<'a> {
    buf: &'a mut [u8],
    limit: usize,
    offset: usize,
}

impl BoundedWriter<'_> {
    fn put(&mut self, bytes: &[u8]) {
        if self.offset < self.limit {
            let room = self.limit - self.offset;
            let n = bytes.len().min(room);
            self.buf[self.offset..self.offset + n].copy_from_slice(&bytes[..n]);
        }
        self.offset += bytes.len();
    }
}

impl Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put(s.as_bytes());
        Ok(())
    }
}

/// Builds response frames and status lines.
#[derive(Debug, Clone)]
pub struct ResponseFramer {
    max_len: usize,
    prefix: String,
    postfix: String,
    ok: String,
    err: String,
}

impl ResponseFramer {
    pub fn new(config: &EngineConfig) -> Self {
        ResponseFramer {
            max_len: config.max_response_len,
            prefix: config.prefix.clone(),
            postfix: config.postfix.clone(),
            ok: config.ok.clone(),
            err: config.err.clone(),
        }
    }

    /// Maximum frame length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Frame formatted text.
    pub fn frame_fmt(&self, flags: RespFlags, args: fmt::Arguments<'_>) -> Frame {
        self.build(flags, |w| {
            if flags.contains(RespFlags::PAYLOAD) {
                // BoundedWriter never fails.
                let _ = w.write_fmt(args);
            }
        })
    }

    /// Frame a byte array as upper-case hex pairs.
    pub fn frame_array(&self, flags: RespFlags, data: &[u8]) -> Frame {
        self.build(flags, |w| {
            for byte in data {
                let _ = write!(w, "{:02X}", byte);
            }
        })
    }

    /// Status line frames for a completed command.
    ///
    /// Success gives `OK`, a specific error gives `+<NAME>:<hex>` followed by
    /// `ERR`, anything else gives `ERR:<code>`.
    pub fn status(&self, err: CmdError, name: &str, app_err: u16) -> Vec<Frame> {
        match err {
            CmdError::NoError => vec![self.frame_fmt(RespFlags::ALL, format_args!("{}", self.ok))],
            CmdError::SpecificError => vec![
                self.frame_fmt(RespFlags::ALL, format_args!("+{}:{:X}", name, app_err)),
                self.frame_fmt(RespFlags::ALL, format_args!("{}", self.err)),
            ],
            other => vec![self.frame_fmt(
                RespFlags::ALL,
                format_args!("{}:{}", self.err, other.code()),
            )],
        }
    }

    fn build<F>(&self, flags: RespFlags, payload: F) -> Frame
    where
        F: FnOnce(&mut BoundedWriter<'_>),
    {
        // One extra byte for the terminator slot.
        let mut buf = BytesMut::zeroed(self.max_len + 1);
        let mut writer = BoundedWriter {
            buf: &mut buf,
            limit: self.max_len,
            offset: 0,
        };

        if flags.contains(RespFlags::PREFIX) {
            writer.put(self.prefix.as_bytes());
        }

        payload(&mut writer);

        let mut offset = writer.offset;
        if flags.contains(RespFlags::POSTFIX) {
            let postfix = self.postfix.as_bytes();
            if offset + postfix.len() <= self.max_len {
                buf[offset..offset + postfix.len()].copy_from_slice(postfix);
            }
            offset += postfix.len();
        }

        let truncated = offset > self.max_len;
        if truncated {
            log::error!(
                "response of {} bytes truncated to {}; increase max_response_len",
                offset,
                self.max_len
            );
            offset = self.max_len;
        }

        buf.truncate(offset);
        Frame {
            data: buf.freeze(),
            truncated,
        }
    }
}
