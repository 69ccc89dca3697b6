//! Signed URLs for backends without native presigning.
//!
//! URL form: `{base_url}/{key}?expires={unix_ts}&signature={sig}` where
//! `sig = base64url(HMAC-SHA256(secret, key || "\n" || expires))`.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signed URL has expired")]
    Expired,

    #[error("signed URL signature is invalid")]
    Invalid,
}

#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Signature over `key` valid until `expires_at` (unix seconds).
    pub fn sign(&self, key: &str, expires_at: i64) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires_at.to_string().as_bytes());
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    /// Build a URL for `key` under `base_url` that stops verifying after `ttl`.
    pub fn signed_url(&self, base_url: &str, key: &str, ttl: Duration, now: DateTime<Utc>) -> String {
        let expires_at = now.timestamp() + ttl.as_secs() as i64;
        let signature = self.sign(key, expires_at);
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}?expires={}&signature={}",
            base_url.trim_end_matches('/'),
            encoded_key,
            expires_at,
            signature
        )
    }

    pub fn verify(
        &self,
        key: &str,
        expires_at: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let expected = self.sign(key, expires_at);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(SignatureError::Invalid);
        }
        if now.timestamp() > expires_at {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}
