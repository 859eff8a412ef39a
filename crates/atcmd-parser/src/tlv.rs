//! Decoded parameter values.

use crate::kind::Kind;

/// Per-field decode outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlvStatus {
    /// Decoded and within bounds.
    Ok,
    /// Decoded but outside the bounds.
    RangeExceeded,
    /// Token does not match the kind.
    WrongType,
    /// No token at this position.
    Empty,
    /// Malformed content (odd-length or non-hex array).
    InvalidData,
}

impl TlvStatus {
    /// Whether this status lets the command proceed.
    pub fn is_acceptable(&self) -> bool {
        matches!(self, TlvStatus::Ok | TlvStatus::Empty)
    }

    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TlvStatus::Ok => "ok",
            TlvStatus::RangeExceeded => "range exceeded",
            TlvStatus::WrongType => "wrong type",
            TlvStatus::Empty => "empty",
            TlvStatus::InvalidData => "invalid data",
        }
    }
}

impl std::fmt::Display for TlvStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a decoded parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Nothing decoded.
    None,
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    /// Array, string or unknown-kind content, sized exactly to its length.
    Bytes(Vec<u8>),
}

/// A decoded parameter: kind, status, length and value, with the bounds it
/// was checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    kind: Kind,
    status: TlvStatus,
    length: usize,
    min: i64,
    max: i64,
    value: Value,
}

impl Tlv {
    /// Create an empty value of the given kind with its resolved bounds.
    pub fn new(kind: Kind, min: i64, max: i64) -> Self {
        Tlv {
            kind,
            status: TlvStatus::Empty,
            length: 0,
            min,
            max,
            value: Value::None,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn status(&self) -> TlvStatus {
        self.status
    }

    /// Number of bytes held: the kind's width for numbers, the decoded size
    /// for arrays and strings.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Lower bound (value or length).
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound (value or length).
    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Check whether `n` is within the attached bounds.
    pub(crate) fn in_bounds(&self, n: i64) -> bool {
        n >= self.min && n <= self.max
    }

    pub(crate) fn set(&mut self, status: TlvStatus, length: usize, value: Value) {
        self.status = status;
        self.length = length;
        self.value = value;
    }

    pub(crate) fn set_status(&mut self, status: TlvStatus) {
        self.status = status;
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self.value {
            Value::I8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self.value {
            Value::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self.value {
            Value::I16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self.value {
            Value::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self.value {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self.value {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    /// Any integer payload widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            Value::I8(v) => Some(v as i64),
            Value::U8(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::U16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::U32(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Raw content of an array, string or unknown-kind value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Content of a string value, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match (self.kind, &self.value) {
            (Kind::String | Kind::Unknown, Value::Bytes(b)) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tlv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Value::None => write!(f, "{} : - ({})", self.kind, self.status),
            Value::Bytes(b) if self.kind == Kind::Array => match (b.first(), b.last()) {
                (Some(first), Some(last)) => write!(
                    f,
                    "{} : 0x{:02X}...0x{:02X} ({})[{}~{}]",
                    self.kind, first, last, self.status, self.min, self.max
                ),
                _ => write!(f, "{} : <empty> ({})", self.kind, self.status),
            },
            Value::Bytes(b) => write!(
                f,
                "{} : {} ({})[{}~{}]",
                self.kind,
                String::from_utf8_lossy(b),
                self.status,
                self.min,
                self.max
            ),
            _ => write!(
                f,
                "{} : {} ({})[{}~{}]",
                self.kind,
                self.as_i64().unwrap_or_default(),
                self.status,
                self.min,
                self.max
            ),
        }
    }
}
