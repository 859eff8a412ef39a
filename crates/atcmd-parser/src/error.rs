//! Error types for the parameter parser.

use thiserror::Error;

/// Structural failures of a validation pass.
///
/// Malformed fields are not errors: they are reported per value through
/// [`TlvStatus`](crate::TlvStatus). These variants abort or qualify the pass
/// as a whole.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// The parameter store still holds the values of a previous command.
    #[error("parser busy: parameter store has not been cleared")]
    Busy,

    /// A variable-length value could not be sized to its decoded length.
    #[error("out of memory: could not allocate {requested} bytes")]
    NoMemory {
        /// Number of bytes that were requested.
        requested: usize,
    },

    /// Input remained after every format position was consumed.
    #[error("unconsumed input after the last parameter")]
    MoreData,
}

/// Result type alias for parser operations.
pub type ParserResult<T> = Result<T, ParserError>;
