//! OLE Package binary decoder.
//!
//! Parses the hex-encoded payload of an `\objdata` destination whose object
//! class is `"Package"` into a list of embedded files. The grammar below is
//! reverse-engineered and intentionally strict: any mismatch aborts the
//! decode rather than guessing at an unknown producer's variant.

use crate::error::PackageError;

/// One file carried by an OLE Package, either embedded (`data` present,
/// `ole_type == 3`) or linked (`data` absent, `ole_type == 1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageItem {
    pub path: String,
    pub data: Option<Vec<u8>>,
    pub name: String,
}

/// OLE object linkage: embedded content vs. a link to external content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OleType {
    Linked,
    Static,
}

/// Decoded result of one `\objdata` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub progid: String,
    pub total_size: u32,
    pub strings: Vec<String>,
    pub label: String,
    pub ole_type: OleType,
    pub items: Vec<PackageItem>,
}

/// A cursor over an ASCII-hex byte range, skipping interleaved whitespace.
struct HexCursor<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    end: usize,
    /// Byte counter `bc` from the grammar, tracked alongside `pos`.
    bc: i64,
}

impl<'a> HexCursor<'a> {
    fn new(source: &'a str, begin: usize, end: usize) -> Self {
        HexCursor {
            source,
            bytes: source.as_bytes(),
            pos: begin,
            end,
            bc: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.end && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn hex_digit(&mut self) -> Result<u8, PackageError> {
        self.skip_whitespace();
        if self.pos >= self.end {
            return Err(PackageError::OutOfData {
                offset: self.pos,
                needed: 1,
            });
        }
        let c = self.bytes[self.pos] as char;
        let digit = c.to_digit(16).ok_or(PackageError::BadHexDigit {
            offset: self.pos,
            digit: c,
        })?;
        self.pos += 1;
        Ok(digit as u8)
    }

    fn byte(&mut self) -> Result<u8, PackageError> {
        let hi = self.hex_digit()?;
        let lo = self.hex_digit()?;
        Ok((hi << 4) | lo)
    }

    fn bytes_n(&mut self, n: usize) -> Result<Vec<u8>, PackageError> {
        (0..n).map(|_| self.byte()).collect()
    }

    /// 4-byte big-endian unsigned integer.
    fn u32_be(&mut self) -> Result<u32, PackageError> {
        let b = self.bytes_n(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// 4-byte little-endian unsigned integer.
    fn u32_le(&mut self) -> Result<u32, PackageError> {
        let b = self.bytes_n(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// 2-byte little-endian unsigned integer.
    fn u16_le(&mut self) -> Result<u16, PackageError> {
        let b = self.bytes_n(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// A zero-terminated byte string with no explicit length. Running out of
    /// hex data before a terminator surfaces as `OutOfData` from `byte()`.
    fn cstring(&mut self) -> Result<Vec<u8>, PackageError> {
        let mut out = Vec::new();
        loop {
            let b = self.byte()?;
            if b == 0 {
                return Ok(out);
            }
            out.push(b);
        }
    }

    /// A 4-byte little-endian length prefix, a zero-terminated body (the
    /// final byte consumed must itself be the terminator), returning the
    /// body without its terminator.
    fn length_prefixed_cstring(&mut self) -> Result<(Vec<u8>, usize), PackageError> {
        let start = self.pos;
        let len = self.u32_le()? as usize;
        if len == 0 {
            return Err(PackageError::UnterminatedString { offset: start });
        }
        let mut body = self.bytes_n(len)?;
        let terminator = body.pop().ok_or(PackageError::UnterminatedString {
            offset: self.pos,
        })?;
        if terminator != 0 {
            return Err(PackageError::UnterminatedString { offset: self.pos });
        }
        Ok((body, len))
    }

    /// A 4-byte little-endian length prefix followed by exactly that many
    /// raw bytes (no terminator) — used for binary payloads.
    fn length_prefixed_bytes(&mut self) -> Result<(Vec<u8>, usize), PackageError> {
        let len = self.u32_le()? as usize;
        let data = self.bytes_n(len)?;
        Ok((data, len))
    }

    fn to_cstring(bytes: Vec<u8>) -> String {
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Decode the hex payload of an `\objdata` block in `source[begin..end]`.
pub fn decode(source: &str, begin: usize, end: usize) -> Result<Package, PackageError> {
    let mut cur = HexCursor::new(source, begin, end);

    let magic_offset = cur.pos;
    let magic = cur.u32_be()?;
    if magic != 0x0105_0000 {
        return Err(PackageError::BadMagic {
            offset: magic_offset,
            actual: magic,
        });
    }

    let const_offset = cur.pos;
    let constant = cur.u32_le()?;
    if constant != 2 {
        return Err(PackageError::UnexpectedConstant {
            offset: const_offset,
            actual: constant,
        });
    }

    let (progid_bytes, _) = cur.length_prefixed_cstring()?;
    let progid = HexCursor::to_cstring(progid_bytes);

    let _reserved1 = cur.u32_le()?;
    let _reserved2 = cur.u32_le()?;

    let size_offset = cur.pos;
    let total_size = cur.u32_le()?;
    if !(2..=1_048_576).contains(&total_size) {
        return Err(PackageError::SizeOutOfRange {
            offset: size_offset,
            size: total_size,
        });
    }

    cur.bc = 0;

    let count_offset = cur.pos;
    let string_count = cur.u16_le()?;
    if !(2..=10).contains(&string_count) {
        return Err(PackageError::StringTableCountOutOfRange {
            offset: count_offset,
            count: string_count,
        });
    }

    let mut strings = Vec::with_capacity(string_count as usize);
    let mut strings_byte_len = 0usize;
    for _ in 0..string_count {
        let s = cur.cstring()?;
        strings_byte_len += s.len() + 1;
        strings.push(HexCursor::to_cstring(s));
    }
    let label = strings[0].clone();

    let terminator_offset = cur.pos;
    let terminator = cur.u16_le()?;
    if terminator != 0 {
        return Err(PackageError::BadTerminator {
            offset: terminator_offset,
            actual: terminator,
        });
    }
    cur.bc += 2 + strings_byte_len as i64 + 2;

    let type_offset = cur.pos;
    let ole_type_value = cur.u16_le()?;
    let ole_type = match ole_type_value {
        1 => OleType::Linked,
        3 => OleType::Static,
        other => {
            return Err(PackageError::UnsupportedOleType {
                offset: type_offset,
                value: other,
            });
        },
    };

    let mut items = Vec::new();
    match ole_type {
        OleType::Static => {
            while cur.bc != i64::from(total_size) - 2 {
                let (path_bytes, path_len) = cur.length_prefixed_cstring()?;
                let (data, data_len) = cur.length_prefixed_bytes()?;
                let path = HexCursor::to_cstring(path_bytes);
                let name = derive_name(&path);
                items.push(PackageItem {
                    path,
                    data: Some(data),
                    name,
                });
                cur.bc += (path_len + 5) as i64;
                cur.bc += (data_len + 4) as i64;
                if cur.bc > i64::from(total_size) - 2 {
                    return Err(PackageError::ByteCounterMismatch {
                        offset: cur.pos,
                        expected: i64::from(total_size) - 2,
                        actual: cur.bc,
                    });
                }
            }
        },
        OleType::Linked => {
            let link_count = cur.u16_le()?;
            for _ in 0..link_count {
                let path_bytes = cur.cstring()?;
                let mut path = HexCursor::to_cstring(path_bytes);
                if path.contains('~') {
                    path = path.replace('~', &label);
                }
                let name = derive_name(&path);
                items.push(PackageItem {
                    path,
                    data: None,
                    name,
                });
            }
            if cur.bc != i64::from(total_size) - 2 {
                return Err(PackageError::ByteCounterMismatch {
                    offset: cur.pos,
                    expected: i64::from(total_size) - 2,
                    actual: cur.bc,
                });
            }
        },
    }

    let final_offset = cur.pos;
    let final_terminator = cur.u16_le()?;
    if final_terminator != 0 {
        return Err(PackageError::BadTerminator {
            offset: final_offset,
            actual: final_terminator,
        });
    }

    Ok(Package {
        progid,
        total_size,
        strings,
        label,
        ole_type,
        items,
    })
}

fn derive_name(path: &str) -> String {
    match path.rfind('\\') {
        Some(idx) => path[idx + 1..].to_string(),
        None => path.to_string(),
    }
}

impl Package {
    /// Look up an embedded file by its derived basename.
    pub fn find(&self, name: &str) -> Option<&PackageItem> {
        self.items.iter().find(|item| item.name == name)
    }
}
