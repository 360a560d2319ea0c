use thiserror::Error;

/// Infrastructure failures of auth workflows. Input problems are not errors
/// here; they come back as field errors inside the response envelope.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    Conflict,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("session error: {0}")]
    Session(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Conflict => 1002,
            AuthError::HashError(_) => 1101,
            AuthError::Session(_) => 1103,
            AuthError::Repository(_) => 1200,
        }
    }
}
