use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use actix_web::web;
use argon2::Argon2;
use rand::rngs::OsRng;
use std::sync::OnceLock;

use crate::error::{AppError, AuthError};

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Hashes `password` with Argon2id and a fresh random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verifies `password` against a stored PHC string.
///
/// A mismatch is `InvalidCredentials`; an unparseable stored hash is `Hashing`.
pub fn check_password_hash(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(AuthError::InvalidCredentials),
        Err(e) => Err(AuthError::Hashing(e.to_string())),
    }
}

/// Runs a full verification against a fixed throwaway hash and discards the outcome.
/// Used on logins for unknown emails.
fn check_dummy_hash(password: &str) {
    let dummy = DUMMY_HASH.get_or_init(|| hash_password("chirpy-unknown-account").ok());
    if let Some(hash) = dummy {
        let _ = check_password_hash(password, hash);
    }
}

/// `hash_password` on the blocking thread pool.
pub async fn spawn_hash_password(password: String) -> Result<String, AppError> {
    let hashed = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))??;
    Ok(hashed)
}

/// `check_password_hash` on the blocking thread pool. With no stored hash the
/// dummy hash is checked instead and the result is always `InvalidCredentials`.
pub async fn spawn_check_password_hash(
    password: String,
    hash: Option<String>,
) -> Result<(), AppError> {
    web::block(move || match hash {
        Some(hash) => check_password_hash(&password, &hash),
        None => {
            check_dummy_hash(&password);
            Err(AuthError::InvalidCredentials)
        }
    })
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))??;
    Ok(())
}
