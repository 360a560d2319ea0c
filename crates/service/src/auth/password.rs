//! Credential policy and Argon2id hashing.
//!
//! Hashing and verification are CPU-bound and run on the blocking pool; both
//! are awaited to completion before the caller sees a result.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use super::errors::AuthError;

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 20;

/// Usernames must be longer than two characters.
pub fn username_is_valid(username: &str) -> bool {
    username.chars().count() > 2
}

/// 6 to 20 characters on a single line, with at least one digit, one
/// lowercase and one uppercase ASCII letter.
pub fn password_is_strong(password: &str) -> bool {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return false;
    }
    if password.chars().any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')) {
        return false;
    }
    password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
}

/// Argon2id hasher with fixed cost parameters.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon: Argon2<'static>,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self { argon: Argon2::default() }
    }
}

impl Argon2Hasher {
    pub fn new(cfg: &configs::AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Self { argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) })
    }

    /// Hash `password` into a PHC string with a fresh random salt.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let argon = self.argon.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
        })
        .await
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .map_err(|e| AuthError::HashError(e.to_string()))
    }

    /// Check `password` against a stored PHC string. A mismatch is `Ok(false)`;
    /// a malformed hash is an error.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let argon = self.argon.clone();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();
        tokio::task::spawn_blocking(move || -> Result<bool, password_hash::Error> {
            let parsed = PasswordHash::new(&stored_hash)?;
            match argon.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .map_err(|e| AuthError::HashError(e.to_string()))
    }
}
