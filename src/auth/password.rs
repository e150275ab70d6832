use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::ApiError;

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            ApiError::Internal(anyhow::anyhow!(e.to_string()))
        })?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        ApiError::Internal(anyhow::anyhow!(e.to_string()))
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_matching_password() {
        let hash = hash_password("hunter2hunter2").expect("hash");
        assert!(verify_password("hunter2hunter2", &hash).expect("verify"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("right-password").expect("hash");
        assert!(!verify_password("wrong-password", &hash).expect("verify"));
    }

    #[test]
    fn malformed_hash_is_an_internal_error() {
        let err = verify_password("anything", "garbage").unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
