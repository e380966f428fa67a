//! Password hashing and verification using Argon2id.
//!
//! Hashes are PHC strings with a random per-hash salt. An optional pepper
//! (server-side secret) is prepended to the password before hashing and
//! must match at verification time. Both operations are CPU-bound and the
//! async entry points run them on the blocking thread pool.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};

use crate::config::AuthConfig;
use crate::error::AuthError;

#[derive(Clone)]
pub struct CredentialVerifier {
    params: Params,
    pepper: Option<Arc<str>>,
}

impl CredentialVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;

        Ok(Self {
            params,
            pepper: config.pepper.as_deref().map(Arc::from),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, password: &str) -> String {
        match &self.pepper {
            Some(p) => format!("{p}{password}"),
            None => password.to_string(),
        }
    }

    /// Hash a password with a freshly generated salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let input = self.peppered(password);
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(input.as_bytes(), &salt)
            .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a PHC-format hash.
    ///
    /// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
    /// `Err(AuthError::Crypto)` if the stored hash is malformed.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = argon2::PasswordHash::new(hash)
            .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

        let input = self.peppered(password);
        match self.argon2().verify_password(input.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let this = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || this.hash_password(&password))
            .await
            .map_err(|e| AuthError::Crypto(format!("hashing task failed: {e}")))?
    }

    pub async fn compare(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let this = self.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || this.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Crypto(format!("verification task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier(pepper: Option<&str>) -> CredentialVerifier {
        CredentialVerifier::new(&AuthConfig {
            pepper: pepper.map(Into::into),
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..AuthConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn correct_password_matches() {
        let v = verifier(None);
        let hash = v.hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(v.verify_password("hunter2", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let v = verifier(None);
        let hash = v.hash_password("hunter2").unwrap();
        assert!(!v.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn salts_differ_per_hash() {
        let v = verifier(None);
        assert_ne!(v.hash_password("same").unwrap(), v.hash_password("same").unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = verifier(Some("pepper!")).hash_password("hunter2").unwrap();
        assert!(verifier(Some("pepper!")).verify_password("hunter2", &hash).unwrap());
        // Without pepper should fail.
        assert!(!verifier(None).verify_password("hunter2", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        let result = verifier(None).verify_password("pw", "not-a-hash");
        assert!(matches!(result, Err(AuthError::Crypto(_))));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let result = CredentialVerifier::new(&AuthConfig {
            argon2_iterations: 0,
            ..AuthConfig::default()
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn async_round_trip() {
        let v = verifier(None);
        let hash = v.hash("Secret123!").await.unwrap();
        assert!(v.compare("Secret123!", &hash).await.unwrap());
        assert!(!v.compare("secret123!", &hash).await.unwrap());
    }
}
