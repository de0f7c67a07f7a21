//! Password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tokio::task;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("password hashing task failed")]
    Task(#[source] task::JoinError),
}

/// Hash a password into a PHC string using Argon2id.
pub async fn hash_password(password: String) -> Result<String, PasswordError> {
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| PasswordError::Hash(error.to_string()))
    })
    .await
    .map_err(PasswordError::Task)?
}

/// Check a password against a stored PHC string.
pub async fn verify_password(password: String, hash: String) -> Result<bool, PasswordError> {
    task::spawn_blocking(move || {
        let parsed =
            PasswordHash::new(&hash).map_err(|error| PasswordError::Hash(error.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(PasswordError::Task)?
}
