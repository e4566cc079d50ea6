//! The `rtf_to_html` entry point and its minimal reference HTML collaborator.
//!
//! Section 6's `output_sink`/styling rules are specified only as a
//! collaborator *contract* — this module supplies a reference collaborator
//! sufficient for the scenarios in this crate's own tests, not a complete
//! HTML renderer (font/size mapping, bullets, image placement are
//! genuinely out of scope here).

use std::rc::Rc;

use crate::error::{RtfError, RtfResult};
use crate::package::PackageItem;
use crate::parser::{new_parser, ParserOptions};
use crate::registry::Handler;
use crate::token::{Token, TokenKind};

/// Named-field configuration for [`rtf_to_html`], replacing section 6's
/// positional `(base_url, output_sink, version)` parameters.
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    pub base_url: String,
    pub version: u32,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        HtmlOptions {
            base_url: String::new(),
            version: 2,
        }
    }
}

/// Convert `rtf_text` to HTML. `files`, when given, accumulates the
/// embedded Package items extracted from any `\objdata` block, matching
/// the `output_sink`'s `files` collection from section 6.
pub fn rtf_to_html(
    rtf_text: &str,
    options: HtmlOptions,
    files: Option<&mut Vec<PackageItem>>,
) -> RtfResult<String> {
    if options.version != 2 {
        return Err(RtfError::UnsupportedHtmlVersion(options.version));
    }

    let mut parser = new_parser(rtf_text, ParserOptions::default())?;
    parser.register("rtf", Rc::new(HtmlHandler) as Rc<dyn Handler>);
    let document = parser.document(false)?;

    if let Some(sink) = files {
        sink.extend(document.files.iter().cloned());
    }

    Ok(document.html.clone())
}

/// Appends a coarse HTML rendering of the top-level narrative text onto
/// `document.html`: bold runs and hex-escaped characters are rendered,
/// everything else is dropped. Tables, fields, and drawing objects are not
/// attempted, per the named Non-goals.
#[derive(Debug)]
struct HtmlHandler;

impl Handler for HtmlHandler {
    fn handle(
        &self,
        token: &Token,
        source: &str,
        offset: usize,
        ctx: &mut crate::context::ParseContext,
    ) -> RtfResult<()> {
        match token.kind() {
            TokenKind::ControlWord => {
                let name = token.control_name(source, offset).unwrap_or("");
                if name == "b" {
                    if token.value() == Some(0) {
                        ctx.document.html.push_str("</B>");
                    } else {
                        ctx.document.html.push_str("<B>");
                    }
                }
            },
            TokenKind::Data => {
                ctx.document.html.push_str(token.text(source, offset));
            },
            TokenKind::Character => {
                if let Some(value) = token.value() {
                    ctx.document.html.push(value as u8 as char);
                }
            },
            _ => {},
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_version_is_rejected() {
        let err = rtf_to_html(
            "{\\rtf1 Hi}",
            HtmlOptions {
                base_url: String::new(),
                version: 1,
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, RtfError::UnsupportedHtmlVersion(1)));
    }

    #[test]
    fn trivial_document_renders_text() {
        let html = rtf_to_html("{\\rtf1 Hello}", HtmlOptions::default(), None).unwrap();
        assert!(html.contains("Hello"));
    }

    #[test]
    fn bold_run_is_wrapped() {
        let html = rtf_to_html("{\\rtf1 \\b on\\b0 off}", HtmlOptions::default(), None).unwrap();
        assert!(html.contains("<B>on</B>off"));
    }

    #[test]
    fn hex_escape_renders_as_character() {
        let html = rtf_to_html("{\\rtf1 A\\'41B}", HtmlOptions::default(), None).unwrap();
        assert!(html.contains("AAB"));
    }

    #[test]
    fn ignorable_destination_is_skipped_and_kept_text_survives() {
        let html = rtf_to_html(
            "{\\rtf1{\\*\\unknown garbage}Kept}",
            HtmlOptions::default(),
            None,
        )
        .unwrap();
        assert!(html.contains("Kept"));
    }
}
