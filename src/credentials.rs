use argon2::Config;
use rand::Rng;
use tokio::task;

use crate::error::ServiceError;
use crate::validation::MIN_PASSWORD_LEN;

/// Hashes a plaintext password into an encoded Argon2 string with a fresh
/// random salt. The hashing itself runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let encoded = task::spawn_blocking(move || {
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        argon2::hash_encoded(password.as_bytes(), &salt, &Config::default())
    })
    .await??;
    Ok(encoded)
}

/// A malformed stored hash never matches.
pub async fn verify_password(encoded: String, password: String) -> Result<bool, ServiceError> {
    let matches = task::spawn_blocking(move || {
        argon2::verify_encoded(&encoded, password.as_bytes()).unwrap_or(false)
    })
    .await?;
    Ok(matches)
}
