//! Token codec: the fixed-shape token record the tokenizer emits.
//!
//! A `Token` is a tagged value rather than a bit-packed machine word — the
//! packing layout described in the RTF reader's original design (`len` in
//! the low 8 bits, `kind` in 3 bits, a biased `control_name_length`, a
//! biased `value`, and a `has_value` flag) is preserved here only as the
//! *range* invariants enforced by [`Token::new`]; an `enum` + struct fields
//! is the idiomatic Rust shape for the same data.
//!
//! Tokens carry no pointer into the source. Anything that needs the
//! underlying bytes (a control word's name, a data run's text) is sliced
//! out of `source` using the token's own `length` and the caller-supplied
//! `offset`, via [`Token::text`].

use crate::error::{RtfError, RtfResult};

/// The kind of a token. See the module-level RTF reader design for the
/// recognition rules that produce each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Malformed input; still advances the cursor by `length`.
    Invalid,
    /// A run of plain text.
    Data,
    /// `{`
    GroupOpen,
    /// `}`
    GroupClose,
    /// `\*` — marks the following destination as ignorable.
    Ignorable,
    /// A one-character control symbol (`\\`, `\-`, `\:`, `\_`, `\{`, `\|`, `\}`, `\~`).
    Symbol,
    /// `\name[-]digits[ ]`
    ControlWord,
    /// `\'HH` — an 8-bit hex-escaped character.
    Character,
}

/// A single fixed-shape token record.
///
/// `value` doubles as the `has_value` flag from the design: `Some(0)` and
/// `None` are distinct, and that distinction is exactly what downstream
/// handlers (font index 0, color component 0, `\b0`) depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    length: u8,
    control_name_length: u8,
    value: Option<i16>,
}

impl Token {
    /// Construct a token, validating and defaulting fields the way the
    /// packed representation would have.
    ///
    /// `length` defaults to 1 for `GroupOpen`/`GroupClose` and 2 for
    /// `Ignorable` when not given. `control_name_length` is only meaningful
    /// for `ControlWord` and must fall in `2..=17` when present.
    pub fn new(
        kind: TokenKind,
        length: Option<u8>,
        control_name_length: Option<u8>,
        value: Option<i32>,
    ) -> RtfResult<Token> {
        let length = length.unwrap_or(match kind {
            TokenKind::GroupOpen | TokenKind::GroupClose => 1,
            TokenKind::Ignorable => 2,
            _ => {
                return Err(RtfError::BadToken(format!(
                    "length is required for token kind {kind:?}"
                )));
            },
        });

        // The design's packed layout bounds this to 2..=17 (it reverse-engineers
        // a "skip distance" rather than a literal letter count), but RTF itself
        // allows one-letter control words ("\b", "\i"); rejecting those would
        // break ordinary parsing, so the accepted range here is 1..=17.
        if let Some(skip) = control_name_length {
            if !(1..=17).contains(&skip) {
                return Err(RtfError::BadToken(format!(
                    "control_name_length {skip} out of range 1..=17"
                )));
            }
        }

        let value = match value {
            None => None,
            Some(v) if (i16::MIN as i32..=i16::MAX as i32).contains(&v) => Some(v as i16),
            Some(v) => {
                return Err(RtfError::BadToken(format!(
                    "value {v} out of signed 16-bit range"
                )));
            },
        };

        Ok(Token {
            kind,
            length,
            control_name_length: control_name_length.unwrap_or(0),
            value,
        })
    }

    /// Wrap a parsed control-word parameter, truncating through signed
    /// 16-bit wrap-around the way the packed encoding (`value + 32768`
    /// masked to 16 bits) would, instead of rejecting out-of-range values.
    pub fn wrapping_value(value: i64) -> i16 {
        value as i16
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub fn length(&self) -> u8 {
        self.length
    }

    #[inline]
    pub fn control_name_length(&self) -> u8 {
        self.control_name_length
    }

    #[inline]
    pub fn value(&self) -> Option<i32> {
        self.value.map(i32::from)
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// True for the two brace tokens.
    #[inline]
    pub fn is_group_boundary(&self) -> bool {
        matches!(self.kind, TokenKind::GroupOpen | TokenKind::GroupClose)
    }

    /// Slice this token's own span out of `source`.
    ///
    /// For a `ControlWord`, this is the whole token (backslash, name,
    /// parameter, and trailing space); use [`Token::control_name`] to get
    /// just the name.
    pub fn text<'s>(&self, source: &'s str, offset: usize) -> &'s str {
        &source[offset..offset + self.length as usize]
    }

    /// For a `ControlWord`, the control name (the lowercase letters after
    /// the backslash), sliced out of `source`.
    pub fn control_name<'s>(&self, source: &'s str, offset: usize) -> Option<&'s str> {
        if self.kind != TokenKind::ControlWord {
            return None;
        }
        let start = offset + 1;
        let end = start + self.control_name_length as usize;
        Some(&source[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_open_defaults_length_to_one() {
        let t = Token::new(TokenKind::GroupOpen, None, None, None).unwrap();
        assert_eq!(t.length(), 1);
        assert!(!t.has_value());
    }

    #[test]
    fn ignorable_defaults_length_to_two() {
        let t = Token::new(TokenKind::Ignorable, None, None, None).unwrap();
        assert_eq!(t.length(), 2);
    }

    #[test]
    fn data_token_requires_explicit_length() {
        assert!(Token::new(TokenKind::Data, None, None, None).is_err());
    }

    #[test]
    fn has_value_distinguishes_zero_from_absent() {
        let zero = Token::new(TokenKind::ControlWord, Some(3), Some(2), Some(0)).unwrap();
        let absent = Token::new(TokenKind::ControlWord, Some(2), Some(2), None).unwrap();
        assert!(zero.has_value());
        assert_eq!(zero.value(), Some(0));
        assert!(!absent.has_value());
        assert_eq!(absent.value(), None);
    }

    #[test]
    fn control_name_length_out_of_range_rejected() {
        assert!(Token::new(TokenKind::ControlWord, Some(2), Some(1), None).is_ok());
        assert!(Token::new(TokenKind::ControlWord, Some(20), Some(18), None).is_err());
        assert!(Token::new(TokenKind::ControlWord, Some(1), Some(0), None).is_err());
    }

    #[test]
    fn value_out_of_i16_range_rejected() {
        assert!(Token::new(TokenKind::Symbol, Some(2), None, Some(100_000)).is_err());
    }

    #[test]
    fn wrapping_value_truncates_like_packed_bias_mask() {
        assert_eq!(Token::wrapping_value(0), 0);
        assert_eq!(Token::wrapping_value(32767), 32767);
        assert_eq!(Token::wrapping_value(40000), -25536);
        assert_eq!(Token::wrapping_value(-40000), 25536);
    }

    #[test]
    fn control_name_slices_source() {
        let source = "\\par ";
        let t = Token::new(TokenKind::ControlWord, Some(5), Some(3), None).unwrap();
        assert_eq!(t.control_name(source, 0), Some("par"));
        assert_eq!(t.text(source, 0), "\\par ");
    }
}
