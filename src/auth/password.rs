//! Password hashing
//!
//! bcrypt is CPU bound, so hashing and verification run on the blocking pool.

use thiserror::Error;

const BCRYPT_COST: u32 = 12;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Password hashing task failed: {0}")]
    Task(String),
}

pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Returns `Ok(false)` on mismatch; malformed hashes are errors
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("motdepasse").await.unwrap();
        assert_ne!(hash, "motdepasse");
        assert!(verify_password("motdepasse", &hash).await.unwrap());
        assert!(!verify_password("autre", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash() {
        assert!(verify_password("motdepasse", "not-a-hash").await.is_err());
    }
}
