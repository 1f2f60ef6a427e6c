//! Password hashing (bcrypt, run on the blocking pool)

use thiserror::Error;

use crate::core::constants::PASSWORD_HASH_COST;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash a password with a fresh salt
pub async fn hash_password(password: String) -> Result<String, PasswordError> {
    run_blocking(move || bcrypt::hash(password, PASSWORD_HASH_COST)).await
}

/// Compare a password against a stored bcrypt hash
pub async fn verify_password(password: String, hash: String) -> Result<bool, PasswordError> {
    run_blocking(move || bcrypt::verify(password, &hash)).await
}

async fn run_blocking<T, F>(f: F) -> Result<T, PasswordError>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("password".to_string()).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hash.contains("$10$"));
        assert!(
            verify_password("password".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash_password("password".to_string()).await.unwrap();
        let b = hash_password("password".to_string()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_error() {
        assert!(
            verify_password("password".to_string(), "not-a-hash".to_string())
                .await
                .is_err()
        );
    }
}
