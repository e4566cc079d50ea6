//! A Rich Text Format (RTF) reader: a tokenizer, a generic
//! destination-dispatch parser, and an OLE Package binary decoder.
//!
//! The tokenizer and parser are collaborator-extensible: a caller builds a
//! [`Parser`] with [`new_parser`], registers [`Handler`]s for the
//! destinations it cares about, and drives the parse with
//! [`Parser::document`]. A minimal reference HTML collaborator is included
//! as [`rtf_to_html`], sufficient to render bold runs, plain text, and hex
//! character escapes; production-grade HTML formatting (tables, fields,
//! images, full style mapping) is left to the embedder.
//!
//! This crate never installs a global `tracing` subscriber; wire one up in
//! the binary that links it to see the `trace`/`debug`/`warn`/`error`
//! spans emitted while scanning and dispatching.

mod context;
mod document;
mod error;
mod frame;
mod handlers;
mod html;
mod package;
mod parser;
mod registry;
mod token;
mod tokenizer;
mod value;

pub use context::ParseContext;
pub use document::{Color, Document, Font};
pub use error::{PackageError, RtfError, RtfResult};
pub use frame::Frame;
pub use html::{rtf_to_html, HtmlOptions};
pub use package::{OleType, Package, PackageItem};
pub use parser::{new_parser, Parser, ParserOptions};
pub use registry::{Destination, Handler};
pub use token::{Token, TokenKind};
pub use tokenizer::{next_token, skip_block};
pub use value::Value;
