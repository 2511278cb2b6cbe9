/*
 * Responsibility
 * - password の hash / verify (argon2id, salt はランダム)
 * - product key (REALTOR / ADMIN 登録用の招待キー) の発行と照合
 *   - key = hash("{email}-{role}-{PRODUCT_KEY_SECRET}")
 */
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::services::auth::roles::Role;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// `false` for a wrong password and for an unparsable stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Clone)]
pub struct ProductKeys {
    secret: String,
}

impl std::fmt::Debug for ProductKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductKeys").finish_non_exhaustive()
    }
}

impl ProductKeys {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn material(&self, email: &str, role: Role) -> String {
        format!("{}-{}-{}", email.trim().to_ascii_lowercase(), role, self.secret)
    }

    pub fn generate(&self, email: &str, role: Role) -> Result<String, PasswordError> {
        hash_password(&self.material(email, role))
    }

    pub fn verify(&self, key: &str, email: &str, role: Role) -> bool {
        verify_password(&self.material(email, role), key)
    }
}
