//! AT Command Runner
//!
//! Hosts an [`atcmd_core::Engine`] behind a stdin console or TCP listeners,
//! with a small set of demo commands.
//!
//! - [`codec`]: line accumulation for byte streams
//! - [`config`]: YAML runner configuration
//! - [`console`]: stdin/stdout front end
//! - [`demo`]: `ECHO`, `SUM`, `HEXDUMP` and `ERRTEST`
//! - [`server`]: TCP front end, one port per channel

pub mod codec;
pub mod config;
pub mod console;
pub mod demo;
pub mod error;
pub mod server;

pub use config::{ListenerConfig, RunnerConfig, TransportKind};
pub use error::{RunnerError, RunnerResult};
pub use server::{AtServer, ListenerInfo, SharedEngine};
