//! Credential codec: compact HMAC-SHA256 signed tokens
//!
//! A token is `base64url(claims JSON) + "." + base64url(mac)`. The claims
//! carry the owning account id, an absolute expiry, and a random per-token
//! identifier so that two tokens for the same account and expiry never
//! collide. The codec is a pure function over the signing key: it never
//! consults the store, and revocation/expiry enforcement belongs to the
//! session manager.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes per token identifier (32 hex chars once encoded).
const TOKEN_ID_BYTES: usize = 16;

/// Signed claims embedded in every issued credential.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Claims {
    /// Owning account id.
    pub sub: i64,
    /// Absolute expiry as a Unix timestamp.
    pub exp: i64,
    /// Random per-token identifier, hex-encoded.
    pub jti: String,
}

/// Issues and verifies signed session credentials with a process-wide key.
#[derive(Clone)]
pub struct CredentialCodec {
    key: Vec<u8>,
}

impl CredentialCodec {
    /// Create a codec from the configured signing secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty. A misconfigured key is fatal
    /// at startup; issuing never fails afterwards.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(anyhow!("signing secret must not be empty"));
        }
        Ok(Self {
            key: secret.as_bytes().to_vec(),
        })
    }

    /// Issue a signed token for `account_id` expiring after `ttl`.
    #[must_use]
    pub fn issue(&self, account_id: i64, ttl: Duration) -> String {
        let claims = Claims {
            sub: account_id,
            exp: (Utc::now() + ttl).timestamp(),
            jti: generate_token_id(),
        };
        let payload = serde_json::to_vec(&claims).expect("Failed to serialize claims");
        let signature = self.sign(&payload);

        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Verify a token's signature and structure, returning its claims.
    ///
    /// Returns `None` on any signature mismatch or malformed payload. Expiry
    /// is reported, not enforced: the store's row is authoritative and the
    /// session manager rechecks it on every use.
    #[must_use]
    pub fn decode(&self, token: &str) -> Option<Claims> {
        let (payload_b64, signature_b64) = token.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(&payload);
        mac.verify_slice(&signature).ok()?;

        serde_json::from_slice(&payload).ok()
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Generate a random hex-encoded token identifier.
fn generate_token_id() -> String {
    let mut bytes = [0u8; TOKEN_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> CredentialCodec {
        CredentialCodec::new("test-signing-secret").unwrap()
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(CredentialCodec::new("").is_err());
    }

    #[test]
    fn test_issue_and_decode_roundtrip() {
        let codec = test_codec();
        let token = codec.issue(42, Duration::hours(1));

        let claims = codec.decode(&token).expect("token should decode");
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > Utc::now().timestamp());
        assert_eq!(claims.jti.len(), TOKEN_ID_BYTES * 2);
    }

    #[test]
    fn test_tokens_are_unique_for_identical_input() {
        let codec = test_codec();
        let first = codec.issue(7, Duration::hours(1));
        let second = codec.issue(7, Duration::hours(1));
        assert_ne!(first, second);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = test_codec();
        let token = codec.issue(42, Duration::hours(1));

        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(br#"{"sub":1,"exp":9999999999,"jti":"00"}"#);
        let forged = format!("{forged_payload}.{signature}");
        assert!(codec.decode(&forged).is_none());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = test_codec().issue(42, Duration::hours(1));
        let other = CredentialCodec::new("another-secret").unwrap();
        assert!(other.decode(&token).is_none());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = test_codec();
        assert!(codec.decode("").is_none());
        assert!(codec.decode("no-separator").is_none());
        assert!(codec.decode("not!base64.not!base64").is_none());
        assert!(codec.decode("YWJj.YWJj").is_none());
    }
}
