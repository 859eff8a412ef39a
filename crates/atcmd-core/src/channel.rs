//! Channel table.
//!
//! A channel pairs a transport extractor (how to find the command inside the
//! raw bytes a transport delivers) with an emitter (where responses go). The
//! pool has a fixed size; channels are never released once allocated.

use crate::error::{EngineError, EngineResult};

/// Handle of an allocated channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Sentinel for "no channel".
    pub const INVALID: ChannelId = ChannelId(0xFF);

    pub fn new(id: u8) -> Self {
        ChannelId(id)
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response sink of a channel. Fire-and-forget.
pub type Emitter = Box<dyn Fn(ChannelId, &[u8]) + Send + Sync>;

/// Custom transport extraction: returns the command text inside `data`, or
/// `None` if the data is not a command.
pub type Extractor = Box<dyn for<'a> Fn(ChannelId, &'a [u8]) -> Option<&'a [u8]> + Send + Sync>;

/// How a channel locates the command text inside its input.
pub enum Transport {
    /// Input is already the bare command (`NAME=...`).
    Raw,
    /// Input starts with the command header (`AT+NAME=...`).
    Uart,
    /// Caller-provided extraction.
    Custom(Extractor),
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Raw => write!(f, "Raw"),
            Transport::Uart => write!(f, "Uart"),
            Transport::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Transport {
    /// Extract the command text from `data`.
    ///
    /// For [`Transport::Uart`], the header minus its last character (`AT`)
    /// yields an empty command, which the engine acknowledges with `OK`.
    pub fn extract<'a>(&self, ch: ChannelId, data: &'a [u8], header: &str) -> Option<&'a [u8]> {
        match self {
            Transport::Raw => Some(data),
            Transport::Uart => strip_header(data, header.as_bytes()),
            Transport::Custom(extract) => extract(ch, data),
        }
    }
}

fn strip_header<'a>(data: &'a [u8], header: &[u8]) -> Option<&'a [u8]> {
    if data.len() <= header.len() {
        let bare = &header[..header.len().saturating_sub(1)];
        if data == bare {
            return Some(&data[data.len()..]);
        }
        return None;
    }
    data.strip_prefix(header)
}

/// An allocated channel.
pub struct Channel {
    transport: Transport,
    emitter: Emitter,
}

impl Channel {
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Hand a finished frame to the channel's sink.
    pub fn emit(&self, ch: ChannelId, data: &[u8]) {
        (self.emitter)(ch, data);
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

/// Fixed-size pool of channels.
#[derive(Debug)]
pub struct ChannelTable {
    slots: Vec<Option<Channel>>,
}

impl ChannelTable {
    /// Create a pool of `max` free channels.
    pub fn new(max: usize) -> Self {
        ChannelTable {
            slots: (0..max).map(|_| None).collect(),
        }
    }

    /// Allocate the first free channel.
    pub fn alloc(&mut self, transport: Transport, emitter: Emitter) -> EngineResult<ChannelId> {
        let Some(idx) = self.slots.iter().position(Option::is_none) else {
            log::error!(
                "all {} channels allocated; increase max_channels to add transports",
                self.slots.len()
            );
            return Err(EngineError::NoChannelAvailable {
                max: self.slots.len(),
            });
        };

        self.slots[idx] = Some(Channel { transport, emitter });
        let ch = ChannelId(idx as u8);
        log::debug!("allocated channel {}", ch);
        atcmd_metrics::record_channels_allocated(self.allocated());
        Ok(ch)
    }

    /// Look up an allocated channel.
    pub fn get(&self, ch: ChannelId) -> Option<&Channel> {
        self.slots.get(ch.index()).and_then(Option::as_ref)
    }

    /// Number of allocated channels.
    pub fn allocated(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Size of the pool.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
