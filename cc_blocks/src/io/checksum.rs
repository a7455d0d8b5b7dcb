//! Checksums of stored session payloads.
//!
//! The checksum covers the compact JSON form of the payload. Loading parses
//! the payload back into a value and serializes it again before hashing, so
//! whitespace and indentation in the file do not matter.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 of the compact JSON form of `payload`, hex encoded.
pub fn payload_checksum(payload: &Value) -> Result<String, serde_json::Error> {
    let compact = serde_json::to_vec(payload)?;
    Ok(hex::encode(Sha256::digest(&compact)))
}
