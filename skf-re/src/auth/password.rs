//! Salted password hashing
//!
//! Each account gets a random 16-byte salt; the stored hash is
//! SHA-256(salt || password), hex encoded. Both columns are nullable so
//! externally-federated accounts can exist without a local credential.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a fresh random salt, hex encoded
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

/// Hash a password with its salt
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a submitted password against the stored salt and hash
pub fn verify_password(salt: &str, expected_hash: &str, password: &str) -> bool {
    hash_password(salt, password) == expected_hash
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips() {
        let salt = generate_salt();
        let hash = hash_password(&salt, "hunter22");

        assert!(verify_password(&salt, &hash, "hunter22"));
        assert!(!verify_password(&salt, &hash, "hunter23"));
    }

    #[test]
    fn salts_are_unique_per_call() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn same_password_different_salt_different_hash() {
        let hash_a = hash_password(&generate_salt(), "hunter22");
        let hash_b = hash_password(&generate_salt(), "hunter22");
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn salt_is_32_hex_chars() {
        let salt = generate_salt();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
