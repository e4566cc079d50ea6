//! The document model the built-in handlers (and any collaborator handler)
//! accumulate into as the parser dispatches tokens.

use std::collections::HashMap;

use crate::package::PackageItem;
use crate::value::Value;

/// One entry of the font table, addressed by RTF font index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    pub family: Option<String>,
    pub name: Option<String>,
    pub charset: Option<i32>,
    pub pitch: Option<i32>,
    pub font_type: Option<String>,
    pub codepage: Option<i32>,
}

/// One entry of the color table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// The mutable document root handlers accumulate output into.
#[derive(Debug, Default)]
pub struct Document {
    pub version: Option<i32>,
    pub charset: Option<String>,
    pub codepage: Option<i32>,
    pub default_font_index: Option<i32>,
    pub fonts: Vec<Font>,
    pub colors: Vec<Color>,
    pub html: String,
    /// Embedded files extracted from `\objdata` blocks whose class is
    /// `"Package"`; the `output_sink`'s `files` collection from the external
    /// entry point contract.
    pub files: Vec<PackageItem>,
    /// Collaborator-defined keys outside the fields above.
    pub extra: HashMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    /// Ensure `fonts[index]` exists (growing with default entries) and
    /// return a mutable reference to it.
    pub fn font_mut(&mut self, index: usize) -> &mut Font {
        if self.fonts.len() <= index {
            self.fonts.resize(index + 1, Font::default());
        }
        &mut self.fonts[index]
    }
}
