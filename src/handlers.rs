//! Built-in destination handlers: meta/fonttbl/font/colortbl plus the
//! generic PCDATA helper and the `\objdata` Package extractor.

use std::rc::Rc;

use tracing::error;

use crate::context::ParseContext;
use crate::error::{RtfError, RtfResult};
use crate::package;
use crate::registry::{Handler, HandlerRegistry};
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// Register the meta/fonttbl/f/colortbl handlers against `registry`,
/// matching `new_parser`'s `suppress_defaults = false` default. Does not
/// include Package-extraction support; see [`register_package_support`].
pub fn register_builtins(registry: &mut HandlerRegistry) {
    registry.register("rtf", Rc::new(MetaHandler) as Rc<dyn Handler>);
    registry.register("fonttbl", Rc::new(FontTableHandler) as Rc<dyn Handler>);
    registry.register(";rtf;fonttbl;f", Rc::new(FontHandler) as Rc<dyn Handler>);
    registry.register("colortbl", Rc::new(ColorTableHandler) as Rc<dyn Handler>);
}

/// Register the `object`/`objclass`/`objdata` handlers against `registry`.
/// Unlike [`register_builtins`], this is not gated by `suppress_defaults`:
/// OLE Package extraction is separate plumbing from the meta/fonttbl/
/// colortbl defaults that flag is documented to skip, and an embedder who
/// suppresses those defaults should not also lose Package support with no
/// way to re-register it themselves.
pub fn register_package_support(registry: &mut HandlerRegistry) {
    registry.register("object", Rc::new(ObjectHandler) as Rc<dyn Handler>);
    registry.register("objclass", Rc::new(PcDataHandler) as Rc<dyn Handler>);
    registry.register("objdata", Rc::new(ObjDataHandler) as Rc<dyn Handler>);
}

/// `;rtf` — reads the document version off the opening control word and
/// maps the small set of meta control words dispatched directly under it.
#[derive(Debug)]
pub struct MetaHandler;

impl Handler for MetaHandler {
    fn handle(
        &self,
        token: &Token,
        source: &str,
        offset: usize,
        ctx: &mut ParseContext,
    ) -> RtfResult<()> {
        match token.kind() {
            TokenKind::GroupOpen => {
                let version = ctx.frame().open_token.value();
                ctx.document.version = version;
            },
            TokenKind::ControlWord => {
                let name = token.control_name(source, offset).unwrap_or("");
                match name {
                    "ansi" | "mac" | "pc" | "pca" => {
                        ctx.document.charset = Some(name.to_string());
                    },
                    "ansicpg" => ctx.document.codepage = token.value(),
                    "deff" => ctx.document.default_font_index = token.value(),
                    _ => {},
                }
            },
            _ => {},
        }
        Ok(())
    }
}

/// `;rtf;fonttbl` — a pass-through container; `document.fonts` grows
/// lazily via [`crate::document::Document::font_mut`] as each `f` entry is
/// visited, so this handler only needs to exist to satisfy resolution.
#[derive(Debug)]
pub struct FontTableHandler;

impl Handler for FontTableHandler {
    fn handle(
        &self,
        _token: &Token,
        _source: &str,
        _offset: usize,
        _ctx: &mut ParseContext,
    ) -> RtfResult<()> {
        Ok(())
    }
}

/// `;rtf;fonttbl;f` — one font table entry.
#[derive(Debug)]
pub struct FontHandler;

impl FontHandler {
    fn index(ctx: &ParseContext) -> usize {
        ctx.frame()
            .get("font_index")
            .and_then(Value::as_int)
            .unwrap_or(0) as usize
    }

    fn family(name: &str) -> Option<&'static str> {
        Some(match name {
            "fnil" => "nil",
            "froman" => "roman",
            "fswiss" => "swiss",
            "fmodern" => "modern",
            "fscript" => "script",
            "fdecor" => "decor",
            "ftech" => "tech",
            "fbidi" => "bidi",
            _ => return None,
        })
    }

    fn font_type(name: &str) -> Option<&'static str> {
        Some(match name {
            "ftnil" => "nil",
            "fttruetype" => "truetype",
            _ => return None,
        })
    }
}

impl Handler for FontHandler {
    fn handle(
        &self,
        token: &Token,
        source: &str,
        offset: usize,
        ctx: &mut ParseContext,
    ) -> RtfResult<()> {
        match token.kind() {
            TokenKind::GroupOpen => {
                let idx = ctx.frame().open_token.value().unwrap_or(0);
                ctx.frame_mut().set("font_index", i64::from(idx));
                ctx.document.font_mut(idx.max(0) as usize);
            },
            TokenKind::ControlWord => {
                let idx = Self::index(ctx);
                let name = token.control_name(source, offset).unwrap_or("");
                if let Some(family) = Self::family(name) {
                    ctx.document.font_mut(idx).family = Some(family.to_string());
                } else if let Some(font_type) = Self::font_type(name) {
                    ctx.document.font_mut(idx).font_type = Some(font_type.to_string());
                } else {
                    match name {
                        "fcharset" => ctx.document.font_mut(idx).charset = token.value(),
                        "fprq" => ctx.document.font_mut(idx).pitch = token.value(),
                        "cpg" => ctx.document.font_mut(idx).codepage = token.value(),
                        _ => {},
                    }
                }
            },
            TokenKind::Data => {
                let idx = Self::index(ctx);
                let text = token.text(source, offset).trim_end_matches(';');
                ctx.document.font_mut(idx).name = Some(text.to_string());
            },
            _ => {},
        }
        Ok(())
    }
}

/// `;rtf;colortbl` — one implicit default color plus one new color per
/// data-token semicolon that is actually followed by a component.
#[derive(Debug)]
pub struct ColorTableHandler;

impl Handler for ColorTableHandler {
    fn handle(
        &self,
        token: &Token,
        source: &str,
        offset: usize,
        ctx: &mut ParseContext,
    ) -> RtfResult<()> {
        match token.kind() {
            TokenKind::GroupOpen => {
                ctx.document.colors = vec![crate::document::Color::default()];
                ctx.frame_mut().set("color_index", 0i64);
                ctx.frame_mut().set("need_new_color", false);
            },
            TokenKind::ControlWord => {
                let name = token.control_name(source, offset).unwrap_or("");
                if !matches!(name, "red" | "green" | "blue") {
                    error!(name, offset, "unrecognized color-table token");
                    return Err(RtfError::UnrecognizedInColorTable {
                        name: name.to_string(),
                        offset,
                    });
                }
                let need_new = ctx
                    .frame()
                    .get("need_new_color")
                    .and_then(as_bool)
                    .unwrap_or(false);
                if need_new {
                    ctx.document.colors.push(crate::document::Color::default());
                    let new_index = (ctx.document.colors.len() - 1) as i64;
                    ctx.frame_mut().set("color_index", new_index);
                    ctx.frame_mut().set("need_new_color", false);
                }
                let idx = ctx
                    .frame()
                    .get("color_index")
                    .and_then(Value::as_int)
                    .unwrap_or(0) as usize;
                let component = token.value().unwrap_or(0).clamp(0, 255) as u8;
                let color = &mut ctx.document.colors[idx];
                match name {
                    "red" => color.r = component,
                    "green" => color.g = component,
                    "blue" => color.b = component,
                    _ => unreachable!(),
                }
            },
            TokenKind::Data => {
                if token.text(source, offset).contains(';') {
                    ctx.frame_mut().set("need_new_color", true);
                }
            },
            _ => {},
        }
        Ok(())
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

/// A prefabricated handler for destinations whose body is plain text
/// (e.g. `objclass`): accumulates `Data` tokens and writes the joined
/// string onto the parent frame under the destination's own control name.
#[derive(Debug)]
pub struct PcDataHandler;

impl Handler for PcDataHandler {
    fn handle(
        &self,
        token: &Token,
        source: &str,
        offset: usize,
        ctx: &mut ParseContext,
    ) -> RtfResult<()> {
        match token.kind() {
            TokenKind::GroupOpen => {
                ctx.frame_mut()
                    .user_state
                    .insert("buf".to_string(), Value::List(Vec::new()));
            },
            TokenKind::Data => {
                let text = token.text(source, offset).to_string();
                ctx.frame_mut().entry_list("buf").push(text);
            },
            TokenKind::GroupClose => {
                let joined = ctx
                    .frame()
                    .get("buf")
                    .and_then(Value::as_list)
                    .map(|items| items.concat())
                    .unwrap_or_default();
                let key = ctx.frame().control_name.clone();
                if let Some(parent) = ctx.parent_mut() {
                    parent.set(key, joined);
                }
            },
            _ => {
                let path = ctx.frame().path.clone();
                error!(path = %path, offset, "unexpected token in PCDATA destination");
                return Err(RtfError::UnexpectedInPcData { path, offset });
            },
        }
        Ok(())
    }
}

/// `;...;object` — a pass-through container for `objclass`/`objdata`.
#[derive(Debug)]
pub struct ObjectHandler;

impl Handler for ObjectHandler {
    fn handle(
        &self,
        _token: &Token,
        _source: &str,
        _offset: usize,
        _ctx: &mut ParseContext,
    ) -> RtfResult<()> {
        Ok(())
    }
}

/// `;...;object;objdata` — the hex payload destination. Records the offset
/// of its first ordinary token and, at close, decodes `source[start..end)`
/// directly (the Package decoder already tolerates whitespace and CR/LF
/// interleaved in the hex text) rather than re-accumulating the bytes.
///
/// The Package grammar only applies when the sibling `\objclass` reads
/// `"Package"`; other OLE classes (`Word.Document.8`, bitmaps, …) carry a
/// native OLE byte stream here that does not start with the Package magic,
/// so decoding is skipped entirely rather than attempted and discarded.
#[derive(Debug)]
pub struct ObjDataHandler;

impl Handler for ObjDataHandler {
    fn handle(
        &self,
        token: &Token,
        source: &str,
        offset: usize,
        ctx: &mut ParseContext,
    ) -> RtfResult<()> {
        match token.kind() {
            TokenKind::GroupOpen => {},
            TokenKind::GroupClose => {
                let is_package = ctx
                    .parent()
                    .and_then(|p| p.get("objclass"))
                    .and_then(Value::as_text)
                    == Some("Package");
                if !is_package {
                    return Ok(());
                }
                let start = ctx
                    .frame()
                    .get("start_offset")
                    .and_then(Value::as_int)
                    .map(|v| v as usize)
                    .unwrap_or(offset);
                let package = package::decode(source, start, offset).map_err(|err| {
                    error!(offset, %err, "package decode failed");
                    RtfError::from(err)
                })?;
                ctx.document.files.extend(package.items);
            },
            _ => {
                if ctx.frame().get("start_offset").is_none() {
                    ctx.frame_mut().set("start_offset", offset as i64);
                }
            },
        }
        Ok(())
    }
}
