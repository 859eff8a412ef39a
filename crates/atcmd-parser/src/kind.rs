//! Type descriptor table.
//!
//! Maps each format letter to a primitive kind, its natural bounds and its
//! fixed width. Variable-length kinds have a width of zero and bound the
//! decoded length instead of the value.

/// Primitive kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Signed 8-bit integer (`b`).
    I8,
    /// Unsigned 8-bit integer (`B`).
    U8,
    /// Signed 16-bit integer (`w`).
    I16,
    /// Unsigned 16-bit integer (`W`).
    U16,
    /// Signed 32-bit integer (`d`).
    I32,
    /// Unsigned 32-bit integer (`D`).
    U32,
    /// Hex-encoded byte array (`A`).
    Array,
    /// Raw string (`S`).
    String,
    /// Unrecognized letter or malformed bounds.
    Unknown,
}

/// Static description of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// The kind described.
    pub kind: Kind,
    /// Format letter selecting this kind.
    pub letter: char,
    /// Default lower bound (value for numbers, length for arrays/strings).
    pub min: i64,
    /// Default upper bound (value for numbers, length for arrays/strings).
    pub max: i64,
    /// Width in bytes; zero for variable-length kinds.
    pub width: usize,
}

/// Every kind that a format letter can select, in letter order.
pub const TYPE_TABLE: [TypeDescriptor; 8] = [
    TypeDescriptor { kind: Kind::I8, letter: 'b', min: i8::MIN as i64, max: i8::MAX as i64, width: 1 },
    TypeDescriptor { kind: Kind::U8, letter: 'B', min: 0, max: u8::MAX as i64, width: 1 },
    TypeDescriptor { kind: Kind::I16, letter: 'w', min: i16::MIN as i64, max: i16::MAX as i64, width: 2 },
    TypeDescriptor { kind: Kind::U16, letter: 'W', min: 0, max: u16::MAX as i64, width: 2 },
    TypeDescriptor { kind: Kind::I32, letter: 'd', min: i32::MIN as i64, max: i32::MAX as i64, width: 4 },
    TypeDescriptor { kind: Kind::U32, letter: 'D', min: 0, max: u32::MAX as i64, width: 4 },
    TypeDescriptor { kind: Kind::Array, letter: 'A', min: 0, max: 0xFF, width: 0 },
    TypeDescriptor { kind: Kind::String, letter: 'S', min: 0, max: 0xFFF, width: 0 },
];

/// Descriptor used for [`Kind::Unknown`]: string-like, never in range.
const UNKNOWN_DESCRIPTOR: TypeDescriptor = TypeDescriptor {
    kind: Kind::Unknown,
    letter: '?',
    min: 0,
    max: 0xFFF,
    width: 0,
};

impl Kind {
    /// Resolve a format letter. Unmatched letters give [`Kind::Unknown`].
    pub fn from_letter(letter: char) -> Kind {
        TYPE_TABLE
            .iter()
            .find(|d| d.letter == letter)
            .map(|d| d.kind)
            .unwrap_or(Kind::Unknown)
    }

    /// Get the static descriptor of this kind.
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        TYPE_TABLE
            .iter()
            .find(|d| d.kind == *self)
            .unwrap_or(&UNKNOWN_DESCRIPTOR)
    }

    /// Width in bytes (zero for variable-length kinds).
    pub fn width(&self) -> usize {
        self.descriptor().width
    }

    /// Whether this kind holds a fixed-width integer.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Kind::I8 | Kind::U8 | Kind::I16 | Kind::U16 | Kind::I32 | Kind::U32
        )
    }

    /// Short lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::I8 => "i8",
            Kind::U8 => "u8",
            Kind::I16 => "i16",
            Kind::U16 => "u16",
            Kind::I32 => "i32",
            Kind::U32 => "u32",
            Kind::Array => "array",
            Kind::String => "string",
            Kind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_letter() {
        assert_eq!(Kind::from_letter('b'), Kind::I8);
        assert_eq!(Kind::from_letter('B'), Kind::U8);
        assert_eq!(Kind::from_letter('w'), Kind::I16);
        assert_eq!(Kind::from_letter('W'), Kind::U16);
        assert_eq!(Kind::from_letter('d'), Kind::I32);
        assert_eq!(Kind::from_letter('D'), Kind::U32);
        assert_eq!(Kind::from_letter('A'), Kind::Array);
        assert_eq!(Kind::from_letter('S'), Kind::String);
        assert_eq!(Kind::from_letter('x'), Kind::Unknown);
        assert_eq!(Kind::from_letter('s'), Kind::Unknown);
    }

    #[test]
    fn test_default_bounds() {
        assert_eq!(Kind::U8.descriptor().max, 255);
        assert_eq!(Kind::I32.descriptor().min, -2147483648);
        assert_eq!(Kind::U32.descriptor().max, 4294967295);
        assert_eq!(Kind::Array.descriptor().max, 255);
        assert_eq!(Kind::String.descriptor().max, 4095);
    }

    #[test]
    fn test_widths() {
        assert_eq!(Kind::I8.width(), 1);
        assert_eq!(Kind::U16.width(), 2);
        assert_eq!(Kind::U32.width(), 4);
        assert_eq!(Kind::Array.width(), 0);
        assert_eq!(Kind::Unknown.width(), 0);
        assert!(Kind::I16.is_numeric());
        assert!(!Kind::String.is_numeric());
    }
}
