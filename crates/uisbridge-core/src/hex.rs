//! Hex token codec
//!
//! All user-facing byte sequences are written as whitespace-separated
//! tokens of one byte each, with an optional `0x`/`0X` prefix:
//! `0x00 0x02 0x2B 0x0A`. Parsing is all-or-nothing; a single bad token
//! fails the whole input.

use crate::error::{Error, Result};

/// Parse whitespace-separated hex tokens into bytes.
///
/// Each token may carry a `0x` or `0X` prefix and must resolve to one
/// byte (1-2 hex digits). Byte order follows token order. Whitespace-only
/// input yields an empty vector.
pub fn parse(text: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for token in text.split_whitespace() {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty()
            || digits.len() > 2
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(Error::InvalidFormat(token.to_string()));
        }
        let value = u8::from_str_radix(digits, 16)
            .map_err(|_| Error::InvalidFormat(token.to_string()))?;
        bytes.push(value);
    }
    Ok(bytes)
}

/// Render bytes as `0xNN` tokens (uppercase digits), space-separated.
pub fn format(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
