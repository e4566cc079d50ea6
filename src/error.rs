//! Error types for the RTF reader.

use thiserror::Error;

/// Errors raised while decoding the hex-encoded payload of an OLE `\objdata`
/// block whose object class is `"Package"`.
///
/// Each variant carries the byte offset within the decoded payload at which
/// the mismatch was detected, so a caller can report *where* a brittle,
/// reverse-engineered grammar diverged from an unknown producer's output.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PackageError {
    #[error("bad OLE Package magic at offset {offset}: expected 0x01050000, got {actual:#010x}")]
    BadMagic { offset: usize, actual: u32 },

    #[error("unexpected constant at offset {offset}: expected 2, got {actual}")]
    UnexpectedConstant { offset: usize, actual: u32 },

    #[error("unterminated string at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("ran out of data at offset {offset}, needed {needed} more byte(s)")]
    OutOfData { offset: usize, needed: usize },

    #[error("bad hex digit {digit:?} at offset {offset}")]
    BadHexDigit { offset: usize, digit: char },

    #[error("bad terminator at offset {offset}: expected 0, got {actual}")]
    BadTerminator { offset: usize, actual: u16 },

    #[error(
        "total_size {size} out of range at offset {offset}: expected 2..=1048576"
    )]
    SizeOutOfRange { offset: usize, size: u32 },

    #[error("string table count {count} out of range at offset {offset}: expected 2..=10")]
    StringTableCountOutOfRange { offset: usize, count: u16 },

    #[error("unsupported OLE type {value} at offset {offset}: expected 1 or 3")]
    UnsupportedOleType { offset: usize, value: u16 },

    #[error("byte counter mismatch at offset {offset}: expected {expected}, got {actual}")]
    ByteCounterMismatch {
        offset: usize,
        expected: i64,
        actual: i64,
    },
}

/// Errors raised by the destination-dispatch parser (and, by extension, by
/// the token codec's constructors).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RtfError {
    /// `Token::new` given an invalid kind/length/value/skip combination.
    #[error("bad token: {0}")]
    BadToken(String),

    /// Parser constructed with no source text.
    #[error("parser constructed with no source text")]
    MissingSource,

    /// Token following `{` (and optional `\*`) was not a control word.
    #[error("unexpected token after group open at offset {offset}")]
    UnexpectedAfterOpen { offset: usize },

    /// A non-ignorable destination had no registered handler.
    #[error("unhandled destination {path:?} at offset {offset}")]
    UnhandledDestination { path: String, offset: usize },

    /// `}` encountered with an empty stack.
    #[error("too many closing braces at offset {offset}")]
    TooManyCloses { offset: usize },

    /// A non-`Data` token was seen inside a PCDATA destination.
    #[error("unexpected token in PCDATA destination {path:?} at offset {offset}")]
    UnexpectedInPcData { path: String, offset: usize },

    /// An unrecognized control word appeared inside the color table.
    #[error("unrecognized color-table token {name:?} at offset {offset}")]
    UnrecognizedInColorTable { name: String, offset: usize },

    /// The `rtf_to_html` entry point was called with an unsupported version.
    #[error("unsupported HTML version {0}: only version 2 is supported")]
    UnsupportedHtmlVersion(u32),

    /// Failure while decoding an OLE Package payload.
    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Convenience alias used throughout the crate.
pub type RtfResult<T> = Result<T, RtfError>;
