//! RTF tokenizer: scans source left-to-right, one token per call.
//!
//! `next_token` never fails and never reads past `source.len()`; malformed
//! input is reported as a [`TokenKind::Invalid`] token whose `length` still
//! advances the cursor, per the reader's recognition rules.

use nom::character::complete::digit1;
use nom::Parser as _;

use crate::token::{Token, TokenKind};

/// One-character control symbols the tokenizer must still accept, despite
/// the source's own special-symbol test being self-contradictory (it tests
/// a byte range that can never be simultaneously satisfied). We preserve the
/// *observed* behavior: exactly these eight bytes produce a `Symbol` token;
/// everything else after a backslash with no following letters is `Invalid`.
const SYMBOL_BYTES: &[u8] = b"\\-:_{|}~";

/// Scan one token starting at `source[offset]`.
///
/// Returns the token; the caller advances `offset` by `token.length()`.
/// Panics only if `offset > source.len()` (a caller bug, not malformed RTF).
pub fn next_token(source: &str, offset: usize) -> Token {
    let bytes = source.as_bytes();
    assert!(offset <= bytes.len(), "offset past end of source");

    if offset == bytes.len() {
        // Degenerate: nothing left to scan. Treat as a zero-length Invalid
        // so callers that keep looping until length == 0 terminate cleanly.
        return Token::new(TokenKind::Invalid, Some(0), None, None).unwrap();
    }

    match bytes[offset] {
        b'{' => Token::new(TokenKind::GroupOpen, None, None, None).unwrap(),
        b'}' => Token::new(TokenKind::GroupClose, None, None, None).unwrap(),
        b'\\' => scan_backslash(bytes, offset),
        b'\r' | b'\n' => scan_newline_run(bytes, offset),
        _ => scan_data(bytes, offset),
    }
}

fn scan_backslash(bytes: &[u8], offset: usize) -> Token {
    let after_backslash = offset + 1;
    if after_backslash >= bytes.len() {
        return Token::new(TokenKind::Invalid, Some(1), None, None).unwrap();
    }

    let n = count_lowercase_letters(&bytes[after_backslash..]);
    if n == 0 {
        return scan_control_symbol(bytes, offset);
    }
    scan_control_word(bytes, offset, n)
}

fn count_lowercase_letters(rest: &[u8]) -> usize {
    rest.iter()
        .take_while(|b| b.is_ascii_lowercase())
        .count()
        .min(17)
}

fn scan_control_symbol(bytes: &[u8], offset: usize) -> Token {
    let c = bytes[offset + 1];
    match c {
        b'*' => Token::new(TokenKind::Ignorable, None, None, None).unwrap(),
        b'\'' => scan_hex_char(bytes, offset),
        b if SYMBOL_BYTES.contains(&b) => {
            Token::new(TokenKind::Symbol, Some(2), None, Some(i32::from(b))).unwrap()
        },
        _ => Token::new(TokenKind::Invalid, Some(2), None, None).unwrap(),
    }
}

fn scan_hex_char(bytes: &[u8], offset: usize) -> Token {
    let remaining = bytes.len() - (offset + 2);
    if remaining < 2 {
        return Token::new(TokenKind::Invalid, Some((remaining + 2) as u8), None, None).unwrap();
    }
    let hi = hex_digit(bytes[offset + 2]);
    let lo = hex_digit(bytes[offset + 3]);
    match (hi, lo) {
        (Some(hi), Some(lo)) => {
            let value = (hi << 4) | lo;
            Token::new(TokenKind::Character, Some(4), None, Some(i32::from(value))).unwrap()
        },
        _ => Token::new(TokenKind::Invalid, Some(4), None, None).unwrap(),
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

fn scan_control_word(bytes: &[u8], offset: usize, name_len: usize) -> Token {
    let mut pos = offset + 1 + name_len;

    let (consumed_param, value) = scan_numeric_parameter(bytes, pos);
    pos += consumed_param;

    // A single trailing space is consumed into the token length but is not
    // part of the control name or the numeric parameter.
    if pos < bytes.len() && bytes[pos] == b' ' {
        pos += 1;
    }

    let total_len = pos - offset;
    Token::new(
        TokenKind::ControlWord,
        Some(total_len as u8),
        Some(name_len as u8),
        value,
    )
    .unwrap()
}

/// Scan an optional `-digits` numeric parameter starting at `pos`.
/// Returns (bytes consumed, parsed value-with-wraparound if any).
fn scan_numeric_parameter(bytes: &[u8], pos: usize) -> (usize, Option<i32>) {
    if pos >= bytes.len() {
        return (0, None);
    }
    let rest = &bytes[pos..];
    let negative = rest[0] == b'-';
    let digits_start = usize::from(negative);

    let digit_slice = &rest[digits_start..];
    let parsed: nom::IResult<&[u8], &[u8]> = digit1.parse(digit_slice);

    match parsed {
        Ok((_, digits)) if !digits.is_empty() => {
            let text = std::str::from_utf8(digits).unwrap_or("0");
            let magnitude: i64 = text.parse().unwrap_or(i64::MAX);
            let signed = if negative { -magnitude } else { magnitude };
            let consumed = digits_start + digits.len();
            (consumed, Some(i32::from(Token::wrapping_value(signed))))
        },
        _ => (0, None),
    }
}

fn scan_newline_run(bytes: &[u8], offset: usize) -> Token {
    let mut len = 0usize;
    while offset + len < bytes.len() && len < 255 {
        match bytes[offset + len] {
            b'\r' | b'\n' => len += 1,
            _ => break,
        }
    }
    Token::new(TokenKind::ControlWord, Some(len as u8), None, Some(13)).unwrap()
}

fn scan_data(bytes: &[u8], offset: usize) -> Token {
    let mut len = 0usize;
    while offset + len < bytes.len() && len < 255 {
        match bytes[offset + len] {
            b'\\' | b'{' | b'}' | b'\r' | b'\n' => break,
            _ => len += 1,
        }
    }
    if len == 0 {
        // Can't make forward progress otherwise; consume one byte as Invalid.
        return Token::new(TokenKind::Invalid, Some(1), None, None).unwrap();
    }
    Token::new(TokenKind::Data, Some(len as u8), None, None).unwrap()
}

/// Skip to the offset just past the close brace that brings `initial_depth`
/// back to zero, discarding an unrecognized ignorable destination subtree
/// without invoking any handler.
pub fn skip_block(source: &str, offset: usize, initial_depth: i32) -> usize {
    let mut pos = offset;
    let mut depth = initial_depth;
    loop {
        let token = next_token(source, pos);
        let length = token.length().max(1) as usize;
        match token.kind() {
            TokenKind::GroupOpen => depth += 1,
            TokenKind::GroupClose => {
                depth -= 1;
                if depth == 0 {
                    return pos + length;
                }
            },
            _ => {},
        }
        pos += length;
        if pos >= source.len() {
            return pos;
        }
    }
}
