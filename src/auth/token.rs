//! Signed session and reset assertions.
//!
//! No external JWT dependency — tokens are compact HMAC-SHA256-signed JSON
//! payloads: `base64url(claims) + "." + base64url(mac)`. Session and reset
//! tokens are signed in distinct key contexts (separate secrets, plus a
//! purpose string mixed into key derivation), so a reset token can never
//! replay as a session token even under key-management mistakes.
//!
//! Session claims carry the account email and a `session_version` counter
//! instead of any password material; bumping the counter on password change
//! invalidates every outstanding session without exposing hash bytes in a
//! bearer token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Single opaque failure kind: bad signature, malformed token, and expiry
/// are never distinguished in anything the caller can surface.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("token verification failed")]
pub struct TokenError;

/// Claims embedded in a session assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    pub email: String,
    /// Account `session_version` at issuance; stale values fail identity
    /// resolution (§ password change invalidates sessions).
    pub sv: i64,
    /// Issued-at, Unix seconds. Informational — sessions have no expiry;
    /// revocation is the version counter.
    pub iat: i64,
}

/// Claims embedded in a reset assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResetClaims {
    pub email: String,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// HMAC-SHA256 signer/verifier for one token purpose.
#[derive(Clone)]
pub struct TokenSigner {
    key: [u8; 32],
}

impl TokenSigner {
    /// Derive the signing key from a secret and a purpose label
    /// ("session" / "reset").
    pub fn new(secret: &str, purpose: &str) -> Self {
        let mut h = Sha256::new();
        h.update(purpose.as_bytes());
        h.update([0u8]);
        h.update(secret.as_bytes());
        Self {
            key: h.finalize().into(),
        }
    }

    /// Sign claims into a compact token.
    pub fn issue<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError)?;
        let encoded = URL_SAFE_NO_PAD.encode(&payload);
        let mac = self.mac_for(encoded.as_bytes());
        Ok(format!("{encoded}.{}", URL_SAFE_NO_PAD.encode(mac)))
    }

    /// Verify a token and decode its claims.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let (encoded, sig) = token.split_once('.').ok_or(TokenError)?;
        let sig_bytes = URL_SAFE_NO_PAD.decode(sig).map_err(|_| TokenError)?;

        let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|_| TokenError)?;
        mac.update(encoded.as_bytes());
        // verify_slice is constant-time
        mac.verify_slice(&sig_bytes).map_err(|_| TokenError)?;

        let payload = URL_SAFE_NO_PAD.decode(encoded).map_err(|_| TokenError)?;
        serde_json::from_slice(&payload).map_err(|_| TokenError)
    }

    /// Verify a reset token and enforce its expiry. Expiry folds into the
    /// same opaque error as a bad signature.
    pub fn verify_reset(&self, token: &str) -> Result<ResetClaims, TokenError> {
        let claims: ResetClaims = self.verify(token)?;
        if claims.exp <= epoch_secs() {
            return Err(TokenError);
        }
        Ok(claims)
    }

    fn mac_for(&self, data: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

impl SessionClaims {
    pub fn new(email: &str, session_version: i64) -> Self {
        Self {
            email: email.to_owned(),
            sv: session_version,
            iat: epoch_secs(),
        }
    }
}

impl ResetClaims {
    pub fn new(email: &str, ttl_secs: u64) -> Self {
        Self {
            email: email.to_owned(),
            exp: epoch_secs() + ttl_secs as i64,
        }
    }
}

/// Current Unix epoch in seconds.
pub fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_signer() -> TokenSigner {
        TokenSigner::new("session-secret", "session")
    }

    fn reset_signer() -> TokenSigner {
        TokenSigner::new("reset-secret", "reset")
    }

    #[test]
    fn session_round_trip() {
        let signer = session_signer();
        let claims = SessionClaims::new("a@x.com", 3);
        let token = signer.issue(&claims).unwrap();
        let decoded: SessionClaims = signer.verify(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn tampered_token_fails() {
        let signer = session_signer();
        let token = signer.issue(&SessionClaims::new("a@x.com", 0)).unwrap();
        let mut tampered = token.clone();
        tampered.replace_range(0..1, if token.starts_with('A') { "B" } else { "A" });
        assert!(signer.verify::<SessionClaims>(&tampered).is_err());
    }

    #[test]
    fn malformed_tokens_fail() {
        let signer = session_signer();
        assert!(signer.verify::<SessionClaims>("").is_err());
        assert!(signer.verify::<SessionClaims>("no-dot-here").is_err());
        assert!(signer.verify::<SessionClaims>("a.b.c").is_err());
        assert!(signer.verify::<SessionClaims>("!!!.###").is_err());
    }

    #[test]
    fn reset_token_never_verifies_as_session() {
        let reset = reset_signer();
        let token = reset.issue(&ResetClaims::new("a@x.com", 3600)).unwrap();
        assert!(session_signer().verify::<SessionClaims>(&token).is_err());
    }

    #[test]
    fn cross_purpose_fails_even_with_same_secret() {
        // Same operator secret for both purposes must still not cross over.
        let session = TokenSigner::new("shared", "session");
        let reset = TokenSigner::new("shared", "reset");
        let token = reset.issue(&ResetClaims::new("a@x.com", 3600)).unwrap();
        assert!(session.verify::<SessionClaims>(&token).is_err());
    }

    #[test]
    fn expired_reset_token_fails() {
        let signer = reset_signer();
        let expired = ResetClaims {
            email: "a@x.com".into(),
            exp: epoch_secs() - 1,
        };
        let token = signer.issue(&expired).unwrap();
        assert_eq!(signer.verify_reset(&token), Err(TokenError));
    }

    #[test]
    fn live_reset_token_verifies() {
        let signer = reset_signer();
        let token = signer.issue(&ResetClaims::new("a@x.com", 3600)).unwrap();
        let claims = signer.verify_reset(&token).unwrap();
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn stale_session_version_is_visible_to_caller() {
        let signer = session_signer();
        let token = signer.issue(&SessionClaims::new("a@x.com", 1)).unwrap();
        let decoded: SessionClaims = signer.verify(&token).unwrap();
        // Identity resolution compares this against the stored counter.
        assert_eq!(decoded.sv, 1);
    }
}
