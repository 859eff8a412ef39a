//! Format string compiler.
//!
//! A format string such as `"S,D(~1000)"` compiles into one [`ParamSpec`]
//! per comma-separated token. Compilation never fails: a token that cannot be
//! understood yields a [`Kind::Unknown`] spec, and any argument decoded
//! against it is reported as the wrong type.

use crate::kind::{Kind, TypeDescriptor};
use crate::tlv::Tlv;

/// Separator between format tokens and between input arguments.
pub const FIELD_SEPARATOR: char = ',';

/// Compiled descriptor of one parameter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Resolved kind.
    pub kind: Kind,
    /// Resolved lower bound.
    pub min: i64,
    /// Resolved upper bound.
    pub max: i64,
}

impl ParamSpec {
    /// Spec of a kind with its default bounds.
    pub fn with_defaults(kind: Kind) -> Self {
        let d = kind.descriptor();
        ParamSpec {
            kind,
            min: d.min,
            max: d.max,
        }
    }

    /// Compile a single format token, e.g. `B(0~1)` or `A`.
    pub fn parse(token: &str) -> Self {
        let mut chars = token.chars();
        let Some(letter) = chars.next() else {
            return Self::with_defaults(Kind::Unknown);
        };

        let kind = Kind::from_letter(letter);
        if kind == Kind::Unknown {
            log::error!("unknown parameter type in format token {:?}", token);
            return Self::with_defaults(Kind::Unknown);
        }

        let rest = chars.as_str();
        if rest.is_empty() {
            return Self::with_defaults(kind);
        }

        match parse_bounds(rest, kind.descriptor()) {
            Some((min, max)) => ParamSpec { kind, min, max },
            None => {
                log::error!("malformed bounds in format token {:?}", token);
                Self::with_defaults(Kind::Unknown)
            }
        }
    }

    /// Allocate the empty value this position decodes into.
    pub fn empty_value(&self) -> Tlv {
        Tlv::new(self.kind, self.min, self.max)
    }
}

/// Parse `(<min>~<max>)`, either side optional, against a kind's natural
/// range. Returns `None` if the group is malformed or out of range.
fn parse_bounds(group: &str, desc: &TypeDescriptor) -> Option<(i64, i64)> {
    let body = group.strip_prefix('(')?.strip_suffix(')')?;
    let (lo, hi) = body.split_once('~')?;

    let min = parse_bound(lo, desc.min)?;
    let max = parse_bound(hi, desc.max)?;

    if min < desc.min || max > desc.max {
        return None;
    }

    Some((min, max))
}

fn parse_bound(text: &str, default: i64) -> Option<i64> {
    if text.is_empty() {
        return Some(default);
    }
    text.parse().ok()
}

/// Lazy walk over the tokens of a format string.
///
/// Each step yields the next compiled position; the walk ends when the format
/// is exhausted.
#[derive(Debug, Clone)]
pub struct FormatWalk<'a> {
    tokens: std::str::Split<'a, char>,
}

impl<'a> FormatWalk<'a> {
    pub fn new(format: &'a str) -> Self {
        FormatWalk {
            tokens: format.split(FIELD_SEPARATOR),
        }
    }
}

impl Iterator for FormatWalk<'_> {
    type Item = ParamSpec;

    fn next(&mut self) -> Option<ParamSpec> {
        self.tokens
            .by_ref()
            .find(|t| !t.is_empty())
            .map(ParamSpec::parse)
    }
}

/// Compile a whole format string.
pub fn compile(format: &str) -> Vec<ParamSpec> {
    FormatWalk::new(format).collect()
}
