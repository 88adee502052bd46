//! Webhook signature verification.
//!
//! The identity provider signs each delivery with HMAC-SHA256 over
//! `"{id}.{timestamp}.{body}"`. The signature header carries one or more
//! space-separated `v1,<base64>` entries; verification succeeds when any
//! entry matches. Signatures are compared in constant time, and the
//! timestamp must fall inside a tolerance window so captured deliveries
//! cannot be replayed later.

use crate::error::{ServerError, ServerResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Default replay-tolerance window.
const DEFAULT_TOLERANCE: Duration = Duration::from_secs(5 * 60);

/// A webhook signing secret.
///
/// Accepts the provider's native `whsec_<base64>` form or a raw string
/// used byte-for-byte as the key.
pub struct SigningSecret(Vec<u8>);

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SigningSecret").field(&"<redacted>").finish()
    }
}

impl SigningSecret {
    /// Parses a signing secret.
    pub fn parse(s: &str) -> ServerResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ServerError::ConfigMissing);
        }
        let key = match trimmed.strip_prefix("whsec_") {
            Some(encoded) => BASE64
                .decode(encoded)
                .map_err(|e| ServerError::ConfigInvalid(e.to_string()))?,
            None => trimmed.as_bytes().to_vec(),
        };
        Ok(Self(key))
    }

    fn key(&self) -> &[u8] {
        &self.0
    }
}

/// Verifier (and signer) for webhook deliveries.
pub struct WebhookVerifier {
    secret: SigningSecret,
    tolerance: Duration,
}

impl WebhookVerifier {
    /// Creates a verifier with the default replay tolerance.
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Sets the replay-tolerance window.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Verifies a delivery against the current clock.
    ///
    /// # Arguments
    ///
    /// * `id` - The `provider-id` header value
    /// * `timestamp` - The `provider-timestamp` header value (unix seconds)
    /// * `signature` - The `provider-signature` header value
    /// * `body` - The raw request body
    pub fn verify(
        &self,
        id: &str,
        timestamp: &str,
        signature: &str,
        body: &[u8],
    ) -> ServerResult<()> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.verify_at(id, timestamp, signature, body, now)
    }

    /// Signs a delivery, producing a `v1,<base64>` signature entry.
    pub fn sign(&self, id: &str, timestamp: &str, body: &[u8]) -> String {
        let digest = self.digest(id, timestamp, body).finalize().into_bytes();
        format!("v1,{}", BASE64.encode(digest))
    }

    fn verify_at(
        &self,
        id: &str,
        timestamp: &str,
        signature: &str,
        body: &[u8],
        now: u64,
    ) -> ServerResult<()> {
        let ts: u64 = timestamp
            .trim()
            .parse()
            .map_err(|_| ServerError::verification_failed("timestamp is not a number"))?;
        if now.abs_diff(ts) > self.tolerance.as_secs() {
            return Err(ServerError::verification_failed(
                "timestamp outside tolerance window",
            ));
        }

        for entry in signature.split_whitespace() {
            let Some(encoded) = entry.strip_prefix("v1,") else {
                continue;
            };
            let Ok(candidate) = BASE64.decode(encoded) else {
                continue;
            };
            if self.digest(id, timestamp, body).verify_slice(&candidate).is_ok() {
                return Ok(());
            }
        }
        Err(ServerError::verification_failed("signature mismatch"))
    }

    fn digest(&self, id: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.key())
            .expect("HMAC can take key of any size");
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        mac
    }
}
