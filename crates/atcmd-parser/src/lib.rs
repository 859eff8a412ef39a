//! AT Command Parameter Parser
//!
//! This crate decodes the argument list of an AT command (`AT+NAME=<args>`)
//! against a per-command format string. Every argument position has a typed
//! descriptor compiled from the format, and every raw token decodes into a
//! tagged value ([`Tlv`]) that carries its own status, length and bounds.
//!
//! # Format Strings
//!
//! A format string is a comma-separated list of tokens of the form
//! `<letter>[(<min>~<max>)]`:
//!
//! | Letter | Kind | Default bounds |
//! |--------|------|----------------|
//! | `b` | int8 | -128..=127 |
//! | `B` | uint8 | 0..=255 |
//! | `w` | int16 | -32768..=32767 |
//! | `W` | uint16 | 0..=65535 |
//! | `d` | int32 | i32::MIN..=i32::MAX |
//! | `D` | uint32 | 0..=u32::MAX |
//! | `A` | hex byte array | 0..=255 bytes |
//! | `S` | string | 0..=4095 bytes |
//!
//! Either bound may be omitted: `W(~5)`, `D(30~)`, `A(6~6)`.
//!
//! # Example
//!
//! ```rust
//! use atcmd_parser::{compile, ParamStore, TlvStatus};
//!
//! let specs = compile("B(0~1),A(3~6)");
//! let mut store = ParamStore::new(10);
//! store.validate(b"1,0A1B2C", &specs).unwrap();
//!
//! assert_eq!(store.len(), 2);
//! assert_eq!(store.get(0).unwrap().as_u8(), Some(1));
//! assert_eq!(store.get(1).unwrap().as_bytes(), Some(&[0x0A, 0x1B, 0x2C][..]));
//! assert_eq!(store.get(1).unwrap().status(), TlvStatus::Ok);
//! ```

mod decode;
mod error;
mod format;
mod kind;
mod store;
mod tlv;

pub use decode::decode_token;
pub use error::*;
pub use format::*;
pub use kind::*;
pub use store::*;
pub use tlv::*;
