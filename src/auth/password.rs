//! One-way salted password hashing and constant-time verification.
//!
//! Iterated SHA-256 (100k rounds) with a per-account random salt. Hashing is
//! CPU-bound by design; callers on the async path run it inside
//! `spawn_blocking` to keep request workers free.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Salt byte length before hex encoding.
const SALT_BYTES: usize = 16;

/// Number of SHA-256 iterations for key stretching.
const HASH_ITERATIONS: u32 = 100_000;

/// Generate a random salt (hex-encoded).
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password with salt using iterated SHA-256.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hash = Sha256::new();
    hash.update(salt.as_bytes());
    hash.update(password.as_bytes());
    let mut result = hash.finalize();

    for _ in 1..HASH_ITERATIONS {
        let mut h = Sha256::new();
        h.update(result);
        h.update(salt.as_bytes());
        result = h.finalize();
    }

    hex::encode(result)
}

/// Verify a password attempt against a stored hash, in constant time.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let attempt = hash_password(password, salt);
    constant_time_eq(attempt.as_bytes(), stored_hash.as_bytes())
}

/// Burn the same hashing cost as a real comparison. Used when the account
/// lookup misses, so absent and present emails are indistinguishable by
/// timing.
pub fn burn_verification_cost(password: &str) {
    let _ = hash_password(password, "0000000000000000");
}

/// Constant-time byte comparison.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
