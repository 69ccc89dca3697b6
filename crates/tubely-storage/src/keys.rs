//! Shared key generation for storage backends.
//!
//! Key format: `{prefix}/{hex}.{ext}` with 32 random bytes hex-encoded.

use rand::rngs::OsRng;
use rand::TryRngCore;
use thiserror::Error;

/// Number of random bytes behind every key.
pub const KEY_ENTROPY_BYTES: usize = 32;

#[derive(Debug, Error)]
#[error("failed to read from the OS random source: {0}")]
pub struct KeyError(String);

/// Derive a fresh object key under `prefix` with extension `ext`.
///
/// Fails only when the operating system cannot supply randomness; there is no
/// fallback to a weaker generator.
pub fn derive_key(prefix: &str, ext: &str) -> Result<String, KeyError> {
    let mut bytes = [0u8; KEY_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| KeyError(e.to_string()))?;
    Ok(format!("{}/{}.{}", prefix, hex::encode(bytes), ext))
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/') && !key.contains('\\')
}

/// Content type served for an object, inferred from its extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp4" => "video/mp4",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "png" => "image/png",
        _ => "application/octet-stream",
    }
}
