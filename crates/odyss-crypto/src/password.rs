//! Password hashing using Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, Rng};

use crate::error::{CryptoError, CryptoResult};

/// Bytes of the password that participate in hashing.
pub const PASSWORD_MAX_BYTES: usize = 72;

fn truncated(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(PASSWORD_MAX_BYTES)]
}

/// Hash a password with a fresh random salt. Returns a PHC-format string.
///
/// Only the first 72 bytes of the UTF-8 encoding are hashed, so two
/// passwords sharing that prefix verify against each other's hash.
pub fn hash_password(password: &str) -> CryptoResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(truncated(password), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::Hash(e.to_string()))
}

/// Verify a password against a PHC-format hash.
///
/// Any failure, including a malformed or corrupted hash, is `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(
                subsystem = "crypto",
                component = "password",
                error = %e,
                "Stored password hash is malformed"
            );
            return false;
        }
    };
    Argon2::default()
        .verify_password(truncated(password), &parsed)
        .is_ok()
}

/// Random alphanumeric string, used for throwaway guest passwords.
pub fn random_secret(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn test_input_truncated_to_72_bytes() {
        let base = "x".repeat(PASSWORD_MAX_BYTES);
        let hash = hash_password(&format!("{}tail-one", base)).unwrap();
        assert!(verify_password(&format!("{}tail-two", base), &hash));
        assert!(verify_password(&base, &hash));
        assert!(!verify_password(&base[..71], &hash));
    }

    #[test]
    fn test_malformed_hash_is_false() {
        assert!(!verify_password("secret1", ""));
        assert!(!verify_password("secret1", "not-a-hash"));
        assert!(!verify_password("secret1", "$2b$12$corruptedbcryptstring"));
        assert!(!verify_password("secret1", "$argon2id$v=19$m=19456,t=2,p=1$!!!$???"));
    }

    #[test]
    fn test_random_secret() {
        let a = random_secret(24);
        let b = random_secret(24);
        assert_eq!(a.len(), 24);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
