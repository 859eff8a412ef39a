//! Line-based codec for the TCP transport.
//!
//! Hosts send one command per line, terminated with `\r`, `\n` or `\r\n`.
//! Bytes are accumulated until a terminator arrives; the terminator and any
//! blank lines are dropped.

use bytes::BytesMut;

/// Longest line accepted before the buffer is discarded.
pub const MAX_LINE_LENGTH: usize = 1024;

/// Accumulates received bytes and yields complete command lines.
#[derive(Debug, Default)]
pub struct LineCodec {
    buffer: BytesMut,
    /// Dropping the rest of an over-long line up to its terminator.
    discarding: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(MAX_LINE_LENGTH),
            discarding: false,
        }
    }

    /// Add received data to the buffer.
    ///
    /// If no terminator shows up within [`MAX_LINE_LENGTH`] bytes the whole
    /// line is dropped, including whatever of it arrives in later reads.
    pub fn push(&mut self, data: &[u8]) {
        let data = if self.discarding {
            match data.iter().position(is_terminator) {
                Some(end) => {
                    self.discarding = false;
                    &data[end..]
                }
                None => {
                    log::trace!("discarding {} more bytes of over-long line", data.len());
                    return;
                }
            }
        } else {
            data
        };

        self.buffer.extend_from_slice(data);
        if self.buffer.len() > MAX_LINE_LENGTH && !self.buffer.iter().any(is_terminator) {
            log::warn!("discarding {} bytes without line terminator", self.buffer.len());
            self.buffer.clear();
            self.discarding = true;
        }
    }

    /// Take the next complete, non-empty line.
    pub fn decode_line(&mut self) -> Option<Vec<u8>> {
        loop {
            let end = self.buffer.iter().position(is_terminator)?;
            let line = self.buffer.split_to(end);

            let skip = self.buffer.iter().take_while(|b| is_terminator(b)).count();
            let _ = self.buffer.split_to(skip);

            if !line.is_empty() {
                return Some(line.to_vec());
            }
        }
    }

    /// Number of bytes waiting for a terminator.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}

fn is_terminator(byte: &u8) -> bool {
    *byte == b'\r' || *byte == b'\n'
}
