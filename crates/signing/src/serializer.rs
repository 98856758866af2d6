//! Pluggable value serializers.

use std::io;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::Formatter;

use crate::error::{Result, SigningError};

/// Turns a JSON value into bytes and back before signing.
pub trait Serializer: Send + Sync {
    fn dumps(&self, value: &Value) -> Result<Vec<u8>>;

    fn loads(&self, bytes: &[u8]) -> Result<Value>;
}

/// Compact JSON with ASCII-only output.
///
/// No whitespace between tokens, and every non-ASCII character (plus DEL)
/// escaped as lowercase `\uXXXX`, so equal values always sign identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn dumps(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
        value
            .serialize(&mut ser)
            .map_err(SigningError::serialization)?;
        Ok(buf)
    }

    fn loads(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(SigningError::serialization)
    }
}

/// Compact formatter escaping everything outside printable ASCII.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\u{7f}' {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
