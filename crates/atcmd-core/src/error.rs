//! Error types for the command engine.

use atcmd_parser::ParserError;
use thiserror::Error;

use crate::channel::ChannelId;

/// Status code reported to the host in a command's status line.
///
/// The numeric value is what appears after `ERR:` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CmdError {
    /// Success; rendered as `OK`.
    #[default]
    NoError = 0,
    /// Unknown command, or a known command with an invalid suffix.
    NotSupported = 1,
    /// Argument count does not match the command, or input was left over.
    WrongArgumentCount = 2,
    /// Arguments decoded but their content was rejected by the handler.
    WrongArgumentContent = 3,
    /// At least one argument had the wrong type or was out of range.
    WrongArgumentTypeOrRange = 4,
    /// The command does not support the requested command type.
    WrongExecuteType = 5,
    /// Handler-specific failure; the application code is reported separately.
    SpecificError = 0x80,
}

impl CmdError {
    /// Numeric wire code.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn is_ok(&self) -> bool {
        *self == CmdError::NoError
    }
}

impl std::fmt::Display for CmdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CmdError::NoError => write!(f, "no error"),
            CmdError::NotSupported => write!(f, "not supported"),
            CmdError::WrongArgumentCount => write!(f, "wrong argument count"),
            CmdError::WrongArgumentContent => write!(f, "wrong argument content"),
            CmdError::WrongArgumentTypeOrRange => write!(f, "wrong argument type or range"),
            CmdError::WrongExecuteType => write!(f, "wrong execute type"),
            CmdError::SpecificError => write!(f, "specific error"),
        }
    }
}

/// Errors building the command registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A command was registered with an empty name.
    #[error("command name must not be empty")]
    EmptyName,

    /// A command name contains a character reserved by the command syntax.
    #[error("invalid command name {0:?}: '=', '?' and ',' are reserved")]
    InvalidName(String),

    /// Two commands share the same name.
    #[error("duplicate command {0:?}")]
    DuplicateCommand(String),
}

/// Errors returned by the engine's public operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The channel pool is exhausted.
    #[error("no channel available: all {max} channels are allocated")]
    NoChannelAvailable {
        /// Size of the channel pool.
        max: usize,
    },

    /// The channel handle was never allocated.
    #[error("invalid channel {0}")]
    InvalidChannel(ChannelId),

    /// Zero-length input.
    #[error("empty input")]
    EmptyInput,

    /// The input did not resolve to a supported command.
    #[error("command not supported")]
    NotSupported,

    /// A known command was sent without `=`, `?` or `=?`.
    #[error("command {0} sent without a verb")]
    MissingVerb(String),

    /// Structural parser failure.
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// Invalid command table.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
