//! AT Command Engine
//!
//! This crate dispatches AT commands (`AT+<NAME>?`, `AT+<NAME>=?`,
//! `AT+<NAME>=<args>`) received on any number of logical channels to
//! registered handlers, and frames their responses.
//!
//! - [`Registry`]: sorted, immutable command table with prefix lookup
//! - [`Engine`]: the dispatcher; owns the registry, the channel table and the
//!   parameter store
//! - [`ResponseFramer`]: bounded `prefix + payload + postfix` frames
//! - [`ChannelTable`]: fixed pool of transport/emitter pairs
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use atcmd_core::{CommandDescriptor, Engine, EngineConfig, RespFlags, Transport};
//!
//! let greet = CommandDescriptor::new("GREET", "S(1~16)", 1, "<name>", |p| {
//!     if !p.is_ok() {
//!         return;
//!     }
//!     if let Some(name) = p.arg(0).and_then(|a| a.as_str()) {
//!         p.respond(RespFlags::ALL, format_args!("+GREET:hello {}", name));
//!     }
//! });
//!
//! let mut engine = Engine::new(EngineConfig::default(), vec![greet]).unwrap();
//! let out = Arc::new(Mutex::new(Vec::new()));
//! let sink = out.clone();
//! let ch = engine
//!     .alloc_channel(Transport::Uart, move |_, data| sink.lock().unwrap().extend_from_slice(data))
//!     .unwrap();
//!
//! engine.process(ch, b"AT+GREET=bob").unwrap();
//! assert_eq!(&*out.lock().unwrap(), b"\r\n+GREET:hello bob\r\n\r\nOK\r\n");
//! ```

pub mod builtin;
pub mod channel;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod framer;
pub mod registry;

pub use channel::{Channel, ChannelId, ChannelTable, Emitter, Extractor, Transport};
pub use command::{CommandDescriptor, CommandHandler, CommandParams, CommandType, Responder};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{CmdError, EngineError, EngineResult, RegistryError};
pub use framer::{Frame, RespFlags, ResponseFramer};
pub use registry::Registry;

pub use atcmd_parser as parser;
