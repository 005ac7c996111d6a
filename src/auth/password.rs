//! Password hashing with Argon2id
//!
//! Digests are PHC strings carrying algorithm, parameters and a random salt,
//! so two hashes of the same password never match byte for byte.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::auth::AuthError;
use crate::config::SecurityConfig;

/// Argon2id hasher with fixed cost parameters
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AuthError::PasswordHashing(format!("invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(security.hash_memory_kib, security.hash_iterations)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `password` with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))
    }

    /// `Ok(false)` for a wrong password; `Err` only if the stored digest is unreadable
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswordHashing(format!("invalid hash format: {e}")))?;

        // Parameters come from the PHC string, so digests made under older settings still verify
        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswordHashing(e.to_string())),
        }
    }
}
