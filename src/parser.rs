//! The generic destination-dispatch parser: owns the source, the cursor,
//! the brace stack, the document root, and the handler registry.

use std::rc::Rc;

use tracing::{debug, error, trace, warn};

use crate::context::ParseContext;
use crate::document::Document;
use crate::error::{RtfError, RtfResult};
use crate::frame::Frame;
use crate::registry::{Destination, Handler, HandlerRegistry};
use crate::token::{Token, TokenKind};
use crate::tokenizer::{next_token, skip_block};

/// Constructor-time options, mirroring the embedder-facing `new_parser`
/// contract's `strict?`/`suppress_defaults?` parameters.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Reserved for future stricter-mode behavior; currently unused by any
    /// check in this crate.
    pub strict: bool,
    /// Skip registering the built-in meta/fonttbl/colortbl handlers.
    pub suppress_defaults: bool,
}

/// A single-use, single-threaded parse over one RTF source string.
pub struct Parser<'s> {
    source: &'s str,
    pos: usize,
    document: Document,
    stack: Vec<Frame>,
    registry: HandlerRegistry,
    done: bool,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str, options: ParserOptions) -> RtfResult<Self> {
        if source.is_empty() {
            return Err(RtfError::MissingSource);
        }

        let mut registry = HandlerRegistry::new();
        if !options.suppress_defaults {
            crate::handlers::register_builtins(&mut registry);
        }
        crate::handlers::register_package_support(&mut registry);

        Ok(Parser {
            source,
            pos: 0,
            document: Document::new(),
            stack: Vec::new(),
            registry,
            done: false,
        })
    }

    /// Register `handler` against `destination`; clears the resolver cache.
    pub fn register(&mut self, destination: impl Into<Destination>, handler: Rc<dyn Handler>) {
        self.registry.register(destination, handler);
    }

    /// Run the parser to completion (or, when `incomplete`, just return the
    /// document under construction without driving the scan any further
    /// than it has already gone) and return the document root.
    pub fn document(&mut self, incomplete: bool) -> RtfResult<&Document> {
        if incomplete {
            return Ok(&self.document);
        }
        self.run()?;
        Ok(&self.document)
    }

    /// Convenience accessor returning just the `html` field of the
    /// document-under-construction, for progressive rendering callers.
    pub fn incomplete_html(&self) -> &str {
        &self.document.html
    }

    fn run(&mut self) -> RtfResult<()> {
        if self.done {
            return Ok(());
        }
        while self.pos < self.source.len() {
            self.step()?;
        }
        self.done = true;
        Ok(())
    }

    fn step(&mut self) -> RtfResult<()> {
        let token = next_token(self.source, self.pos);
        trace!(kind = ?token.kind(), offset = self.pos, length = token.length(), "token");

        match token.kind() {
            TokenKind::GroupOpen => self.handle_group_open(token),
            TokenKind::GroupClose => self.handle_group_close(token),
            _ => self.handle_ordinary(token),
        }
    }

    fn handle_group_open(&mut self, brace_token: Token) -> RtfResult<()> {
        let bps = self.pos;
        let mut cursor = bps + brace_token.length() as usize;

        let mut next = next_token(self.source, cursor);
        let ignorable = next.kind() == TokenKind::Ignorable;
        if ignorable {
            cursor += next.length() as usize;
            next = next_token(self.source, cursor);
        }

        if next.kind() != TokenKind::ControlWord {
            error!(offset = bps, "unexpected token after group open");
            return Err(RtfError::UnexpectedAfterOpen { offset: bps });
        }

        let control_name = next
            .control_name(self.source, cursor)
            .unwrap_or_default()
            .to_string();
        let parent_path = self.stack.last().map(|f| f.path.clone());
        let path = match parent_path {
            Some(p) => format!("{p};{control_name}"),
            None => format!(";{control_name}"),
        };

        let handlers = self.registry.resolve(&control_name, &path);

        if handlers.is_empty() {
            if ignorable {
                warn!(path = %path, offset = bps, "skipping ignorable destination with no handler");
                self.pos = skip_block(self.source, bps, 0);
                return Ok(());
            }
            error!(path = %path, offset = bps, "unhandled destination");
            return Err(RtfError::UnhandledDestination { path, offset: bps });
        }

        debug!(path = %path, offset = bps, ignorable, "group open");

        let control_word_end = cursor + next.length() as usize;
        // `frame.open_token` stores the opening control word (so a handler
        // can read e.g. `\rtf1`'s value for the document version), while the
        // dispatched `token` argument for this call is the brace itself.
        let frame = Frame::new(next, bps, control_name, path, ignorable, handlers);
        self.stack.push(frame);

        let frame_index = self.stack.len() - 1;
        for handler in self.stack[frame_index].handlers.clone() {
            let mut ctx = ParseContext::new(&mut self.document, &mut self.stack, frame_index);
            handler.handle(&brace_token, self.source, bps, &mut ctx)?;
        }

        self.pos = control_word_end;
        Ok(())
    }

    fn handle_group_close(&mut self, close_token: Token) -> RtfResult<()> {
        if self.stack.is_empty() {
            error!(offset = self.pos, "too many closing braces");
            return Err(RtfError::TooManyCloses { offset: self.pos });
        }

        let offset = self.pos;
        let frame_index = self.stack.len() - 1;
        debug!(path = %self.stack[frame_index].path, offset, "group close");
        for handler in self.stack[frame_index].handlers.clone() {
            let mut ctx = ParseContext::new(&mut self.document, &mut self.stack, frame_index);
            handler.handle(&close_token, self.source, offset, &mut ctx)?;
        }

        self.stack.pop();
        self.pos += close_token.length() as usize;
        Ok(())
    }

    fn handle_ordinary(&mut self, token: Token) -> RtfResult<()> {
        let offset = self.pos;
        if let Some(frame_index) = self.stack.len().checked_sub(1) {
            for handler in self.stack[frame_index].handlers.clone() {
                let mut ctx = ParseContext::new(&mut self.document, &mut self.stack, frame_index);
                handler.handle(&token, self.source, offset, &mut ctx)?;
            }
        }
        self.pos += token.length().max(1) as usize;
        Ok(())
    }
}

/// Construct a parser over `rtf_text`, matching the embedder-facing
/// `new_parser(rtf_text, strict?, suppress_defaults?)` contract.
pub fn new_parser(rtf_text: &str, options: ParserOptions) -> RtfResult<Parser<'_>> {
    Parser::new(rtf_text, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_is_rejected() {
        assert!(matches!(
            Parser::new("", ParserOptions::default()),
            Err(RtfError::MissingSource)
        ));
    }

    #[test]
    fn trivial_document_reports_version_and_text() {
        let mut parser = new_parser("{\\rtf1 Hello}", ParserOptions::default()).unwrap();
        let doc = parser.document(false).unwrap();
        assert_eq!(doc.version, Some(1));
        assert!(doc.html.contains("Hello"));
    }

    #[test]
    fn unhandled_destination_without_star_fails() {
        let mut parser =
            new_parser("{\\rtf1{\\unknown garbage}Kept}", ParserOptions::default()).unwrap();
        let err = parser.document(false).unwrap_err();
        assert!(matches!(err, RtfError::UnhandledDestination { .. }));
    }

    #[test]
    fn ignorable_unknown_destination_is_skipped() {
        let mut parser = new_parser(
            "{\\rtf1{\\*\\unknown garbage}Kept}",
            ParserOptions::default(),
        )
        .unwrap();
        let doc = parser.document(false).unwrap();
        assert!(doc.html.contains("Kept"));
    }

    #[test]
    fn too_many_closes_is_reported() {
        let mut parser = new_parser("{\\rtf1 Hi}}", ParserOptions::default()).unwrap();
        let err = parser.document(false).unwrap_err();
        assert!(matches!(err, RtfError::TooManyCloses { .. }));
    }

    #[test]
    fn font_table_populates_document_fonts() {
        let mut parser = new_parser(
            "{\\rtf1{\\fonttbl{\\f0\\froman Times;}{\\f1\\fswiss Arial;}}}",
            ParserOptions::default(),
        )
        .unwrap();
        let doc = parser.document(false).unwrap();
        assert_eq!(doc.fonts[0].family.as_deref(), Some("roman"));
        assert_eq!(doc.fonts[0].name.as_deref(), Some("Times"));
        assert_eq!(doc.fonts[1].family.as_deref(), Some("swiss"));
        assert_eq!(doc.fonts[1].name.as_deref(), Some("Arial"));
    }

    #[test]
    fn color_table_populates_document_colors() {
        let mut parser = new_parser(
            "{\\rtf1{\\colortbl;\\red255\\green0\\blue0;\\red0\\green255\\blue0;}}",
            ParserOptions::default(),
        )
        .unwrap();
        let doc = parser.document(false).unwrap();
        assert_eq!(doc.colors.len(), 3);
        assert_eq!(doc.colors[0], crate::document::Color { r: 0, g: 0, b: 0 });
        assert_eq!(
            doc.colors[1],
            crate::document::Color { r: 255, g: 0, b: 0 }
        );
        assert_eq!(
            doc.colors[2],
            crate::document::Color { r: 0, g: 255, b: 0 }
        );
    }

    #[test]
    fn incomplete_html_returns_partial_buffer_without_advancing() {
        let mut parser = new_parser("{\\rtf1 Hello}", ParserOptions::default()).unwrap();
        assert_eq!(parser.incomplete_html(), "");
        let _ = parser.document(true).unwrap();
        assert_eq!(parser.incomplete_html(), "");
    }
}
