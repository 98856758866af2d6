//! Encoding and decoding of signed, timestamped payloads.

use std::io::{Read, Write};
use std::time::Duration;

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde_json::Value;

use crate::config::SigningConfig;
use crate::encoding::{b64_decode, b64_encode};
use crate::error::Result;
use crate::signer::{TimestampSigner, unix_now};

/// Marks a compressed payload.
const COMPRESSED_PREFIX: char = '.';

/// Serialize, encode, timestamp and sign `value`.
pub fn dumps(value: &Value, config: &SigningConfig) -> Result<String> {
    dumps_at(value, config, unix_now().as_secs())
}

/// Like [`dumps`], with an explicit signing time (seconds since the epoch).
pub fn dumps_at(value: &Value, config: &SigningConfig, timestamp: u64) -> Result<String> {
    let mut data = config.serializer.dumps(value)?;

    let mut is_compressed = false;
    if config.compress {
        let compressed = zlib_compress(&data)?;
        // Only worth it if the marker byte doesn't eat the savings
        if compressed.len() < data.len().saturating_sub(1) {
            data = compressed;
            is_compressed = true;
        }
    }

    let mut base64d = b64_encode(&data);
    if is_compressed {
        base64d.insert(0, COMPRESSED_PREFIX);
    }

    Ok(TimestampSigner::new(&config.key, &config.salt).sign_at(&base64d, timestamp))
}

/// Verify and decode a string produced by [`dumps`].
///
/// `max_age` of `None` skips the expiry check.
pub fn loads(signed: &str, config: &SigningConfig, max_age: Option<Duration>) -> Result<Value> {
    loads_at(signed, config, max_age, unix_now())
}

/// Like [`loads`], evaluating the max age at `now` (time since the epoch).
pub fn loads_at(
    signed: &str,
    config: &SigningConfig,
    max_age: Option<Duration>,
    now: Duration,
) -> Result<Value> {
    let base64d = TimestampSigner::new(&config.key, &config.salt).unsign_at(signed, max_age, now)?;

    let (payload, decompress) = match base64d.strip_prefix(COMPRESSED_PREFIX) {
        Some(rest) => (rest, true),
        None => (base64d, false),
    };

    let mut data = b64_decode(payload)?;
    if decompress {
        data = zlib_decompress(&data)?;
    }

    config.serializer.loads(&data)
}

fn zlib_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zlib_decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
