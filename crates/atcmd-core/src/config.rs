//! Engine configuration.
//!
//! Every protocol constant (buffer sizes, literals, header) is a field here, so
//! hosts can load it from a file. Defaults match the stock AT command set.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Default maximum response length, excluding the terminator.
pub const DEFAULT_MAX_RESPONSE_LEN: usize = 256;
/// Default size of the channel pool.
pub const DEFAULT_MAX_CHANNELS: usize = 3;

/// Configuration of an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum length of one response frame.
    pub max_response_len: usize,
    /// Number of channels that can be allocated.
    pub max_channels: usize,
    /// Maximum number of decoded parameters per command.
    pub max_params: usize,
    /// Marker written before each response payload.
    pub prefix: String,
    /// Marker written after each response payload.
    pub postfix: String,
    /// Success status literal.
    pub ok: String,
    /// Failure status literal.
    pub err: String,
    /// Command header stripped by the UART transport.
    pub header: String,
    /// Register the `LISTCMDS` and `DEBUG` commands.
    pub builtins: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_response_len: DEFAULT_MAX_RESPONSE_LEN,
            max_channels: DEFAULT_MAX_CHANNELS,
            max_params: atcmd_parser::DEFAULT_MAX_PARAMS,
            prefix: "\r\n".to_string(),
            postfix: "\r\n".to_string(),
            ok: "OK".to_string(),
            err: "ERR".to_string(),
            header: "AT+".to_string(),
            builtins: true,
        }
    }
}

impl EngineConfig {
    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_response_len == 0 {
            return Err(EngineError::InvalidConfig(
                "max_response_len must be greater than zero".into(),
            ));
        }
        if self.max_channels == 0 || self.max_channels > u8::MAX as usize {
            return Err(EngineError::InvalidConfig(format!(
                "max_channels must be between 1 and {}",
                u8::MAX
            )));
        }
        if self.max_params == 0 {
            return Err(EngineError::InvalidConfig(
                "max_params must be greater than zero".into(),
            ));
        }
        if self.prefix.len() + self.postfix.len() > self.max_response_len {
            return Err(EngineError::InvalidConfig(format!(
                "prefix and postfix ({} bytes) exceed max_response_len ({})",
                self.prefix.len() + self.postfix.len(),
                self.max_response_len
            )));
        }
        if self.header.len() < 2 {
            return Err(EngineError::InvalidConfig(
                "header must be at least two characters".into(),
            ));
        }
        Ok(())
    }
}
