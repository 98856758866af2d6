//! Base64url and base62 helpers for the signed format.

use data_encoding::BASE64URL_NOPAD;

use crate::error::{Result, SigningError};

const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// URL-safe base64 without padding.
pub fn b64_encode(bytes: &[u8]) -> String {
    BASE64URL_NOPAD.encode(bytes)
}

/// Inverse of [`b64_encode`].
pub fn b64_decode(encoded: &str) -> Result<Vec<u8>> {
    BASE64URL_NOPAD
        .decode(encoded.as_bytes())
        .map_err(|_| SigningError::InvalidEncoding)
}

/// Encode a non-negative integer with the `0-9A-Za-z` alphabet.
pub fn b62_encode(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE62_ALPHABET[(value % 62) as usize]);
        value /= 62;
    }

    digits.iter().rev().map(|&d| d as char).collect()
}

/// Inverse of [`b62_encode`].
pub fn b62_decode(encoded: &str) -> Result<u64> {
    if encoded.is_empty() {
        return Err(SigningError::InvalidTimestamp);
    }

    encoded.bytes().try_fold(0u64, |acc, byte| {
        let digit = BASE62_ALPHABET
            .iter()
            .position(|&c| c == byte)
            .ok_or(SigningError::InvalidTimestamp)?;
        acc.checked_mul(62)
            .and_then(|acc| acc.checked_add(digit as u64))
            .ok_or(SigningError::InvalidTimestamp)
    })
}
