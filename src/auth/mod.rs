//! Account credential handling: password policy, hashing, signed assertions.
//!
//! Provides:
//! - Password policy validation (length, symbol class, blocklist)
//! - Salted iterated-SHA-256 hashing with constant-time verification
//! - HMAC-SHA256-signed session and reset assertions with distinct key
//!   contexts
//!
//! ## Design Decisions
//! - No external JWT dependency — assertions are compact HMAC-signed JSON
//!   payloads verified server-side, consistent with the rest of the crypto
//!   stack (`sha2`/`hmac`).
//! - Session tokens carry a per-account version counter rather than hash
//!   material; bumping the counter on password change revokes every
//!   outstanding session.

pub mod password;
pub mod policy;
pub mod token;

pub use policy::validate_password;
pub use token::{ResetClaims, SessionClaims, TokenError, TokenSigner};
