use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, phc::PasswordHash},
};

use crate::error::{AppError, AppResult};

/// Hash a password using Argon2id
///
/// # Arguments
/// * `password` - The plain text password to hash
///
/// # Returns
/// * `AppResult<String>` - The hashed password string or an error
pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes())
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Failed to hash password: {}", e),
        })?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a hash
///
/// A stored hash that fails to parse is an error; a parse that succeeds but
/// does not match the password is `Ok(false)`.
///
/// # Arguments
/// * `password` - The plain text password to verify
/// * `password_hash` - The hashed password to verify against
///
/// # Returns
/// * `AppResult<bool>` - True if password matches, false otherwise
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to parse stored password hash: {}", e),
    })?;
    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
