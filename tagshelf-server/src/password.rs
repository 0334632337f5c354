//! Credential hashing
//!
//! Passwords are stored as argon2id PHC strings with a random salt.
//! Verification parses the stored string, so its parameters travel with it.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{password_hash, Argon2};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored credential is not a valid hash: {0}")]
    Stored(String),

    #[error("password verification failed: {0}")]
    Verify(String),
}

/// Hash a plaintext password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hash(err.to_string()))
}

/// Check a plaintext password against a stored PHC string.
///
/// A wrong password is `Ok(false)`. A malformed stored hash, or one the
/// hasher cannot check (unknown algorithm, bad parameters), is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|err| PasswordError::Stored(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordError::Verify(err.to_string())),
    }
}
