//! Value decoder.
//!
//! Decodes one raw argument token into the [`Tlv`] allocated for its format
//! position. The token never includes the field separator.

use std::num::IntErrorKind;

use crate::error::{ParserError, ParserResult};
use crate::kind::Kind;
use crate::tlv::{Tlv, TlvStatus, Value};

/// Decode `token` into `tlv` according to the value's kind and bounds.
///
/// Per-field problems are recorded in the value's status. An error is only
/// returned when a variable-length buffer cannot be allocated.
pub fn decode_token(token: &[u8], tlv: &mut Tlv) -> ParserResult<()> {
    if token.is_empty() {
        tlv.set(TlvStatus::Empty, 0, Value::None);
        return Ok(());
    }

    match tlv.kind() {
        Kind::I8 | Kind::U8 | Kind::I16 | Kind::U16 | Kind::I32 | Kind::U32 => {
            decode_number(token, tlv);
            Ok(())
        }
        Kind::Array => decode_array(token, tlv),
        Kind::String => decode_string(token, tlv),
        Kind::Unknown => {
            decode_string(token, tlv)?;
            tlv.set_status(TlvStatus::WrongType);
            Ok(())
        }
    }
}

fn decode_number(token: &[u8], tlv: &mut Tlv) {
    let width = tlv.kind().width();
    let parsed = std::str::from_utf8(token)
        .map_err(|_| IntErrorKind::InvalidDigit)
        .and_then(|s| s.parse::<i64>().map_err(|e| e.kind().clone()));

    let n = match parsed {
        Ok(n) => n,
        Err(IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            tlv.set(TlvStatus::RangeExceeded, width, Value::None);
            return;
        }
        Err(_) => {
            tlv.set(TlvStatus::WrongType, 0, Value::None);
            return;
        }
    };

    let value = match tlv.kind() {
        Kind::I8 => i8::try_from(n).ok().map(Value::I8),
        Kind::U8 => u8::try_from(n).ok().map(Value::U8),
        Kind::I16 => i16::try_from(n).ok().map(Value::I16),
        Kind::U16 => u16::try_from(n).ok().map(Value::U16),
        Kind::I32 => i32::try_from(n).ok().map(Value::I32),
        Kind::U32 => u32::try_from(n).ok().map(Value::U32),
        _ => None,
    };

    match value {
        Some(value) => {
            let status = if tlv.in_bounds(n) {
                TlvStatus::Ok
            } else {
                TlvStatus::RangeExceeded
            };
            tlv.set(status, width, value);
        }
        None => tlv.set(TlvStatus::RangeExceeded, width, Value::None),
    }
}

/// Allocate a buffer of exactly `len` bytes, reporting failure instead of
/// aborting.
fn exact_buffer(len: usize) -> ParserResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ParserError::NoMemory { requested: len })?;
    Ok(buf)
}

fn decode_array(token: &[u8], tlv: &mut Tlv) -> ParserResult<()> {
    let len = token.len() / 2;
    let mut buf = exact_buffer(len)?;
    buf.resize(len, 0);

    if hex::decode_to_slice(&token[..len * 2], &mut buf).is_err() {
        log::trace!("non-hex digit in array token");
        tlv.set(TlvStatus::InvalidData, 0, Value::Bytes(Vec::new()));
        return Ok(());
    }

    let status = if token.len() % 2 != 0 {
        TlvStatus::InvalidData
    } else if tlv.in_bounds(len as i64) {
        TlvStatus::Ok
    } else {
        TlvStatus::RangeExceeded
    };
    tlv.set(status, len, Value::Bytes(buf));
    Ok(())
}

fn decode_string(token: &[u8], tlv: &mut Tlv) -> ParserResult<()> {
    let len = token.len();
    let mut buf = exact_buffer(len)?;
    buf.extend_from_slice(token);

    let status = if tlv.in_bounds(len as i64) {
        TlvStatus::Ok
    } else {
        TlvStatus::RangeExceeded
    };
    tlv.set(status, len, Value::Bytes(buf));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ParamSpec;

    fn decode(format: &str, token: &str) -> Tlv {
        let mut tlv = ParamSpec::parse(format).empty_value();
        decode_token(token.as_bytes(), &mut tlv).expect("decode should not fail");
        tlv
    }

    #[test]
    fn test_empty_token() {
        let tlv = decode("B", "");
        assert_eq!(tlv.status(), TlvStatus::Empty);
        assert_eq!(tlv.len(), 0);
    }

    #[test]
    fn test_numeric_in_range() {
        let tlv = decode("B(0~1)", "1");
        assert_eq!(tlv.status(), TlvStatus::Ok);
        assert_eq!(tlv.as_u8(), Some(1));
        assert_eq!(tlv.len(), 1);

        let tlv = decode("d(-3~10)", "-3");
        assert_eq!(tlv.status(), TlvStatus::Ok);
        assert_eq!(tlv.as_i32(), Some(-3));
        assert_eq!(tlv.len(), 4);

        let tlv = decode("D", "4294967295");
        assert_eq!(tlv.as_u32(), Some(u32::MAX));
        assert_eq!(tlv.status(), TlvStatus::Ok);
    }

    #[test]
    fn test_numeric_bounds_round_trip() {
        for (format, min, max) in [
            ("b", i8::MIN as i64, i8::MAX as i64),
            ("W(10~500)", 10, 500),
            ("d(-3~10)", -3, 10),
            ("D(30~)", 30, u32::MAX as i64),
        ] {
            assert_eq!(decode(format, &min.to_string()).status(), TlvStatus::Ok);
            assert_eq!(decode(format, &max.to_string()).status(), TlvStatus::Ok);
            assert_eq!(decode(format, &max.to_string()).as_i64(), Some(max));
            assert_eq!(
                decode(format, &(min - 1).to_string()).status(),
                TlvStatus::RangeExceeded,
                "{} below {}",
                format,
                min
            );
            assert_eq!(
                decode(format, &(max + 1).to_string()).status(),
                TlvStatus::RangeExceeded,
                "{} above {}",
                format,
                max
            );
        }
    }

    #[test]
    fn test_numeric_wrong_type() {
        for token in ["abc", "1x", "0x10", " 1", "-", "1.5"] {
            let tlv = decode("W", token);
            assert_eq!(tlv.status(), TlvStatus::WrongType, "token {:?}", token);
            assert_eq!(tlv.value(), &Value::None);
        }
    }

    #[test]
    fn test_numeric_overflow_is_range() {
        let tlv = decode("B", "256");
        assert_eq!(tlv.status(), TlvStatus::RangeExceeded);
        assert_eq!(tlv.as_u8(), None);
        assert_eq!(tlv.len(), 1);

        let tlv = decode("D", "99999999999999999999999");
        assert_eq!(tlv.status(), TlvStatus::RangeExceeded);
    }

    #[test]
    fn test_hex_array() {
        let tlv = decode("A(3~6)", "0A1B2C");
        assert_eq!(tlv.status(), TlvStatus::Ok);
        assert_eq!(tlv.as_bytes(), Some(&[0x0A, 0x1B, 0x2C][..]));
        assert_eq!(tlv.len(), 3);

        let tlv = decode("A", "0a1b");
        assert_eq!(tlv.as_bytes(), Some(&[0x0A, 0x1B][..]));
    }

    #[test]
    fn test_hex_array_odd_length() {
        let tlv = decode("A", "0A1");
        assert_eq!(tlv.status(), TlvStatus::InvalidData);
        assert_eq!(tlv.len(), 1);
        assert_eq!(tlv.as_bytes(), Some(&[0x0A][..]));
    }

    #[test]
    fn test_hex_array_bad_digit() {
        let tlv = decode("A", "0G");
        assert_eq!(tlv.status(), TlvStatus::InvalidData);
        assert_eq!(tlv.len(), 0);
    }

    #[test]
    fn test_hex_array_length_bounds() {
        assert_eq!(decode("A(6~6)", "0102030405").status(), TlvStatus::RangeExceeded);
        assert_eq!(decode("A(6~6)", "010203040506").status(), TlvStatus::Ok);
    }

    #[test]
    fn test_string() {
        let tlv = decode("S(2~5)", "hello");
        assert_eq!(tlv.status(), TlvStatus::Ok);
        assert_eq!(tlv.as_str(), Some("hello"));
        assert_eq!(tlv.len(), 5);

        assert_eq!(decode("S(2~5)", "x").status(), TlvStatus::RangeExceeded);
        assert_eq!(decode("S(2~5)", "toolong").status(), TlvStatus::RangeExceeded);
    }

    #[test]
    fn test_unknown_kind_is_wrong_type() {
        let tlv = decode("X", "abc");
        assert_eq!(tlv.status(), TlvStatus::WrongType);
        assert_eq!(tlv.as_str(), Some("abc"));

        // An absent argument is still just empty.
        assert_eq!(decode("X", "").status(), TlvStatus::Empty);
    }
}
