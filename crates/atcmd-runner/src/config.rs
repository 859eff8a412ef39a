//! Runner configuration file.
//!
//! ```yaml
//! engine:
//!   max_response_len: 128
//!   max_channels: 4
//! bind: 127.0.0.1
//! listeners:
//!   - port: 7000
//!     transport: uart
//!   - port: 7001
//!     transport: raw
//! ```

use std::path::Path;

use atcmd_core::{EngineConfig, Transport};
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

/// Port of the default listener.
pub const DEFAULT_PORT: u16 = 7000;

/// Top-level runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub engine: EngineConfig,
    /// Address the TCP listeners bind to.
    pub bind: String,
    pub listeners: Vec<ListenerConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            engine: EngineConfig::default(),
            bind: "0.0.0.0".to_string(),
            listeners: vec![ListenerConfig {
                port: DEFAULT_PORT,
                transport: TransportKind::Uart,
            }],
        }
    }
}

impl RunnerConfig {
    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> RunnerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RunnerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| RunnerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace the listener list with one listener per port.
    pub fn override_ports(&mut self, ports: &[u16], transport: TransportKind) {
        if ports.is_empty() {
            return;
        }
        self.listeners = ports
            .iter()
            .map(|&port| ListenerConfig { port, transport })
            .collect();
    }
}

/// One TCP listener, served on its own engine channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    pub port: u16,
    #[serde(default)]
    pub transport: TransportKind,
}

/// Framing expected on a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Lines start with the command header (`AT+`).
    #[default]
    Uart,
    /// Lines are bare commands.
    Raw,
}

impl From<TransportKind> for Transport {
    fn from(kind: TransportKind) -> Self {
        match kind {
            TransportKind::Uart => Transport::Uart,
            TransportKind::Raw => Transport::Raw,
        }
    }
}
