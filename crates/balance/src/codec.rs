//! Decoding of raw JSON-RPC results.
//!
//! Quantities arrive as `0x`-prefixed hex from the node, but some callers hand
//! over plain decimal strings, so both encodings are accepted. ABI strings are
//! decoded at a fixed offset instead of through a general ABI decoder.

use alloy_primitives::{hex, U256};
use serde_json::Value;
use thiserror::Error;

/// Hex characters to skip before the string payload of an ABI-encoded
/// `string` return value: the `0x` prefix, the offset word and the length word.
pub const ABI_STRING_PAYLOAD_OFFSET: usize = 2 + 64 + 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed numeric encoding: {0}")]
    MalformedNumericEncoding(String),

    #[error("Malformed ABI string: {0}")]
    MalformedAbiString(String),
}

/// Parse a `0x`-prefixed hex integer or a decimal integer.
///
/// Enclosing double quotes are stripped first, so raw JSON scalars can be
/// passed as-is.
pub fn decode_hex_or_decimal(raw: &str) -> Result<U256, CodecError> {
    let text = strip_quotes(raw);
    let (digits, radix) = match text.strip_prefix("0x") {
        Some(hex_digits) => (hex_digits, 16),
        None => (text, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(CodecError::MalformedNumericEncoding(format!(
            "{text:?} is not a base-{radix} integer"
        )));
    }

    U256::from_str_radix(digits, u64::from(radix)).map_err(|e| {
        CodecError::MalformedNumericEncoding(format!("{text:?} does not fit in 256 bits: {e}"))
    })
}

/// Decode a JSON-RPC quantity, accepting strings in either encoding and
/// non-negative JSON integers.
pub fn decode_quantity(value: &Value) -> Result<U256, CodecError> {
    match value {
        Value::String(s) => decode_hex_or_decimal(s),
        Value::Number(n) => n.as_u64().map(U256::from).ok_or_else(|| {
            CodecError::MalformedNumericEncoding(format!("{n} is not a non-negative integer"))
        }),
        other => Err(CodecError::MalformedNumericEncoding(format!(
            "expected a string or integer, got {other}"
        ))),
    }
}

/// Decode the symbol text from a raw ABI `string` return value.
pub fn decode_abi_string(raw: &str) -> Result<String, CodecError> {
    let text = strip_quotes(raw);
    let payload = text.get(ABI_STRING_PAYLOAD_OFFSET..).ok_or_else(|| {
        CodecError::MalformedAbiString(format!(
            "expected at least {ABI_STRING_PAYLOAD_OFFSET} hex characters, got {}",
            text.len()
        ))
    })?;

    let bytes = hex::decode(payload)
        .map_err(|e| CodecError::MalformedAbiString(format!("invalid hex payload: {e}")))?;

    Ok(String::from_utf8_lossy(&bytes)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string())
}

fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}
