//! Password policy: pure checks, no side effects.
//!
//! Evaluated before hashing on registration and reset-confirm, and as a
//! fast-fail short circuit on login (a policy-violating password can never
//! match a stored hash, since the hash was only ever created from a
//! policy-passing one).

/// Minimum password length.
const MIN_PASSWORD_LEN: usize = 12;

/// Passwords matching these (case-insensitively) are rejected outright.
const BLOCKLIST: &[&str] = &[
    "password",
    "passwort",
    "123456",
    "123456789",
    "qwerty",
    "letmein",
];

/// Returns true if the candidate satisfies the policy: at least 12
/// characters, at least one ASCII punctuation/symbol character, and not on
/// the blocklist.
pub fn validate_password(candidate: &str) -> bool {
    if candidate.chars().count() < MIN_PASSWORD_LEN {
        return false;
    }
    if !candidate.chars().any(|c| c.is_ascii_punctuation()) {
        return false;
    }
    let lowered = candidate.to_lowercase();
    !BLOCKLIST.iter().any(|blocked| lowered == *blocked)
}
