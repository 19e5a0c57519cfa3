//! Password digests and session tokens.
//!
//! Nothing secret is stored in the clear:
//!
//! - **Passwords** are stored as `salt$digest`, where `salt` is 16 random
//!   bytes in hex and `digest` is the SHA-256 of `salt` followed by the
//!   password. A fresh salt per player means equal passwords never
//!   produce equal rows.
//! - **Session tokens** are 128-bit random hex strings handed to the
//!   player once. Storage only sees their SHA-256, which is unsalted so
//!   a token can be looked up by its digest.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generates a 32-character random hex string (128 bits).
pub fn generate_token() -> String {
    random_hex()
}

/// The storage form of a session token.
pub fn hash_token(token: &str) -> String {
    sha256_hex([token.as_bytes()])
}

/// Produces the `salt$digest` storage form of a password.
pub fn hash_password(password: &str) -> String {
    let salt = random_hex();
    let digest = sha256_hex([salt.as_bytes(), password.as_bytes()]);
    format!("{salt}${digest}")
}

/// Checks `password` against a `salt$digest` produced by [`hash_password`].
///
/// A malformed stored value never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    sha256_hex([salt.as_bytes(), password.as_bytes()]) == digest
}

fn random_hex() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn sha256_hex<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_32_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
        // SHA-256 is 64 hex chars.
        assert_eq!(hash_token("abc").len(), 64);
    }

    #[test]
    fn test_hash_password_is_salted() {
        let a = hash_password("Passw0rd");
        let b = hash_password("Passw0rd");
        assert_ne!(a, b, "same password must not produce the same row");
        assert!(!a.contains("Passw0rd"));
    }

    #[test]
    fn test_verify_password_accepts_only_the_original() {
        let stored = hash_password("Passw0rd");
        assert!(verify_password("Passw0rd", &stored));
        assert!(!verify_password("passw0rd", &stored));
    }

    #[test]
    fn test_verify_password_malformed_stored_value_fails() {
        assert!(!verify_password("Passw0rd", "no-separator"));
        assert!(!verify_password("Passw0rd", ""));
    }
}
