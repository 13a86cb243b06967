//! Reader for specialty lists carried over from the previous WordPress-based
//! directory, which stored them with PHP `serialize()`:
//!
//! ```text
//! a:2:{i:0;s:9:"Ansiedade";i:1;s:10:"Depressão";}
//! ```
//!
//! Lengths are byte counts, so multibyte UTF-8 values must be sliced by bytes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LegacyFormatError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),

    #[error("expected '{expected}' at byte {position}")]
    Expected { expected: char, position: usize },

    #[error("invalid number at byte {0}")]
    InvalidNumber(usize),

    #[error("unsupported type tag '{tag}' at byte {position}")]
    UnsupportedTag { tag: char, position: usize },

    #[error("string at byte {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    #[error("trailing data at byte {0}")]
    TrailingData(usize),

    #[error("arrays nested too deeply at byte {0}")]
    TooDeep(usize),
}

/// Specialty lists are flat; anything deeper than this is not ours.
const MAX_NESTING: usize = 8;

enum SerializedValue {
    Text(String),
    Array(Vec<SerializedValue>),
    Scalar,
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input: input.as_bytes(), pos: 0 }
    }

    fn peek(&self) -> Result<u8, LegacyFormatError> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(LegacyFormatError::UnexpectedEnd(self.pos))
    }

    fn expect(&mut self, expected: u8) -> Result<(), LegacyFormatError> {
        if self.peek()? != expected {
            return Err(LegacyFormatError::Expected {
                expected: expected as char,
                position: self.pos,
            });
        }
        self.pos += 1;
        Ok(())
    }

    /// Consumes bytes up to (not including) `delimiter`, then the delimiter.
    fn take_until(&mut self, delimiter: u8) -> Result<&'a [u8], LegacyFormatError> {
        let start = self.pos;
        let offset = self.input[start..]
            .iter()
            .position(|&b| b == delimiter)
            .ok_or(LegacyFormatError::UnexpectedEnd(self.input.len()))?;
        self.pos = start + offset + 1;
        Ok(&self.input[start..start + offset])
    }

    fn take_usize(&mut self, delimiter: u8) -> Result<usize, LegacyFormatError> {
        let start = self.pos;
        let digits = self.take_until(delimiter)?;
        std::str::from_utf8(digits)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or(LegacyFormatError::InvalidNumber(start))
    }

    fn value(&mut self, depth: usize) -> Result<SerializedValue, LegacyFormatError> {
        let position = self.pos;
        let tag = self.peek()?;
        self.pos += 1;

        match tag {
            b'N' => {
                self.expect(b';')?;
                Ok(SerializedValue::Scalar)
            }
            b'i' | b'd' | b'b' => {
                self.expect(b':')?;
                self.take_until(b';')?;
                Ok(SerializedValue::Scalar)
            }
            b's' => {
                self.expect(b':')?;
                let len = self.take_usize(b':')?;
                self.expect(b'"')?;
                let start = self.pos;
                let end = start
                    .checked_add(len)
                    .filter(|&end| end <= self.input.len())
                    .ok_or(LegacyFormatError::UnexpectedEnd(self.input.len()))?;
                let text = std::str::from_utf8(&self.input[start..end])
                    .map_err(|_| LegacyFormatError::InvalidUtf8(start))?;
                self.pos = end;
                self.expect(b'"')?;
                self.expect(b';')?;
                Ok(SerializedValue::Text(text.to_string()))
            }
            b'a' => {
                if depth >= MAX_NESTING {
                    return Err(LegacyFormatError::TooDeep(position));
                }
                self.expect(b':')?;
                let count = self.take_usize(b':')?;
                self.expect(b'{')?;
                let mut items = Vec::new();
                for _ in 0..count {
                    // keys are ints or strings; only values are kept
                    self.value(depth + 1)?;
                    items.push(self.value(depth + 1)?);
                }
                self.expect(b'}')?;
                Ok(SerializedValue::Array(items))
            }
            other => Err(LegacyFormatError::UnsupportedTag {
                tag: other as char,
                position,
            }),
        }
    }
}

/// Parses a serialized PHP array and returns its string values in order.
/// Non-string values, including nested arrays, are skipped.
pub fn parse_serialized_string_array(input: &str) -> Result<Vec<String>, LegacyFormatError> {
    let mut cursor = Cursor::new(input.trim());

    let items = match cursor.value(0)? {
        SerializedValue::Array(items) => items,
        _ => return Err(LegacyFormatError::Expected { expected: 'a', position: 0 }),
    };

    if cursor.pos != cursor.input.len() {
        return Err(LegacyFormatError::TrailingData(cursor.pos));
    }

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            SerializedValue::Text(text) => Some(text),
            _ => None,
        })
        .collect())
}

/// Turns a stored list column into clean entries. Accepts JSON arrays, legacy
/// serialized arrays, JSON text, or a single plain value. Unreadable legacy
/// data is logged and treated as an empty list.
pub fn decode_string_list(value: &Value) -> Vec<String> {
    let entries = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Value::String(raw) => decode_text_list(raw),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn decode_text_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();

    if trimmed.starts_with("a:") {
        return parse_serialized_string_array(trimmed).unwrap_or_else(|e| {
            warn!("Discarding unreadable serialized list: {}", e);
            Vec::new()
        });
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<Value>>(trimmed)
            .map(|items| {
                items
                    .into_iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_else(|e| {
                warn!("Discarding unreadable JSON list: {}", e);
                Vec::new()
            });
    }

    vec![trimmed.to_string()]
}

pub fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(decode_string_list).unwrap_or_default())
}
