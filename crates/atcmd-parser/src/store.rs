//! Parameter store and validation pass.
//!
//! The store holds the decoded arguments of the command currently being
//! executed. It is filled by one [`ParamStore::validate`] call and must be
//! [cleared](ParamStore::clear) before the next one; a second validation on a
//! populated store is refused with [`ParserError::Busy`].

use crate::decode::decode_token;
use crate::error::{ParserError, ParserResult};
use crate::format::{FormatWalk, ParamSpec, FIELD_SEPARATOR};
use crate::tlv::Tlv;

/// Default maximum number of parameters per command.
pub const DEFAULT_MAX_PARAMS: usize = 10;

/// Bounded scratch list of decoded arguments.
#[derive(Debug)]
pub struct ParamStore {
    params: Vec<Tlv>,
    capacity: usize,
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARAMS)
    }
}

impl ParamStore {
    /// Create an empty store holding at most `capacity` values.
    pub fn new(capacity: usize) -> Self {
        ParamStore {
            params: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Decode `input` against a compiled format.
    ///
    /// Every format position that still has input (possibly an empty token)
    /// produces one value. Returns [`ParserError::MoreData`] if input remains
    /// once the format is exhausted; the store is populated either way.
    pub fn validate<'s, I>(&mut self, input: &[u8], specs: I) -> ParserResult<()>
    where
        I: IntoIterator<Item = &'s ParamSpec>,
    {
        self.walk(input, specs.into_iter().copied())
    }

    /// Compile `format` on the fly and decode `input` against it.
    pub fn validate_format(&mut self, input: &[u8], format: &str) -> ParserResult<()> {
        self.walk(input, FormatWalk::new(format))
    }

    fn walk<I>(&mut self, input: &[u8], specs: I) -> ParserResult<()>
    where
        I: Iterator<Item = ParamSpec>,
    {
        if !self.is_clear() {
            return Err(ParserError::Busy);
        }

        let mut rest = Some(input);
        for spec in specs {
            let Some(remaining) = rest else {
                break;
            };

            let (token, next) = split_field(remaining);
            let mut tlv = spec.empty_value();
            if let Err(e) = decode_token(token, &mut tlv) {
                self.clear();
                return Err(e);
            }
            log::trace!("param[{}] {}", self.params.len(), tlv);

            self.push(tlv);
            rest = next;
        }

        match rest {
            Some(_) => Err(ParserError::MoreData),
            None => Ok(()),
        }
    }

    fn push(&mut self, tlv: Tlv) {
        if self.params.len() < self.capacity {
            self.params.push(tlv);
        } else {
            log::error!(
                "parameter store full ({} entries); increase max_params to accept more arguments",
                self.capacity
            );
        }
    }

    /// Whether no values are held.
    pub fn is_clear(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the value at `idx`.
    pub fn get(&self, idx: usize) -> Option<&Tlv> {
        self.params.get(idx)
    }

    /// All held values, in argument order.
    pub fn params(&self) -> &[Tlv] {
        &self.params
    }

    /// Release every held value.
    pub fn clear(&mut self) {
        self.params.clear();
    }
}

/// Split off the next field. The second element is the input after the
/// separator, or `None` once the input has been fully consumed.
fn split_field(input: &[u8]) -> (&[u8], Option<&[u8]>) {
    match input.iter().position(|&b| b == FIELD_SEPARATOR as u8) {
        Some(pos) => (&input[..pos], Some(&input[pos + 1..])),
        None => (input, None),
    }
}
