//! Argon2id password hashing and verification.
//!
//! The cost factor is an exponent: a hash made at cost `c` uses `2^c` KiB of
//! Argon2 memory, so the work doubles with each step. Everything needed to
//! verify (algorithm, version, parameters, salt, digest) travels inside the
//! PHC string, so hashes made at different costs verify side by side.

use std::sync::OnceLock;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use authgate_core::config::auth::{MAX_HASH_COST, MIN_HASH_COST};
use authgate_core::error::AppError;

/// Argon2 passes over memory. Fixed; the cost exponent drives memory.
const TIME_COST: u32 = 2;
/// Argon2 lanes.
const PARALLELISM: u32 = 1;

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Cost exponent used by [`PasswordHasher::hash`].
    cost: u32,
}

impl PasswordHasher {
    /// Creates a hasher that hashes at the given cost exponent.
    pub fn new(cost: u32) -> Result<Self, AppError> {
        check_cost(cost)?;
        Ok(Self { cost })
    }

    /// The configured cost exponent.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a plaintext password at the configured cost with a fresh salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        self.hash_with_cost(password, self.cost)
    }

    /// Hashes a plaintext password at an explicit cost with a fresh salt.
    pub fn hash_with_cost(&self, password: &str, cost: u32) -> Result<String, AppError> {
        check_cost(cost)?;

        let params = Params::new(1 << cost, TIME_COST, PARALLELISM, None)
            .map_err(|e| AppError::internal(format!("Invalid Argon2 parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Recomputes with the parameters embedded in `hash`; the digest
    /// comparison is constant-time. Anything unparseable, an unknown
    /// algorithm, or parameters above the accepted ceiling yield `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        match Params::try_from(&parsed) {
            Ok(params) if params.m_cost() <= 1 << MAX_HASH_COST => {}
            _ => return false,
        }

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns roughly one verification worth of work and discards the result.
    ///
    /// Used when the username is unknown so the response time does not
    /// reveal whether the account exists.
    pub fn verify_dummy(&self, password: &str) {
        static DUMMY: OnceLock<Option<String>> = OnceLock::new();
        let dummy = DUMMY.get_or_init(|| self.hash("authgate-dummy-password").ok());
        if let Some(hash) = dummy {
            let _ = self.verify(password, hash);
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: authgate_core::config::auth::DEFAULT_HASH_COST,
        }
    }
}

fn check_cost(cost: u32) -> Result<(), AppError> {
    if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&cost) {
        return Err(AppError::validation(format!(
            "Hash cost must be between {MIN_HASH_COST} and {MAX_HASH_COST}, got {cost}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_HASH_COST).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let h = hasher();
        let hash = h.hash("secret1").unwrap();
        assert!(h.verify("secret1", &hash));
        assert!(!h.verify("secret2", &hash));
        assert!(!h.verify("", &hash));
    }

    #[test]
    fn test_hash_is_salted_and_never_plaintext() {
        let h = hasher();
        let a = h.hash("secret1").unwrap();
        let b = h.hash("secret1").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("secret1"));
        assert!(a.starts_with("$argon2id$v=19$"));
    }

    #[test]
    fn test_cost_is_encoded_as_memory_exponent() {
        let h = hasher();
        let hash = h.hash_with_cost("pw", 5).unwrap();
        assert!(hash.contains("m=32,"), "unexpected hash: {hash}");
        assert!(h.verify("pw", &hash));
    }

    #[test]
    fn test_verify_across_costs() {
        let low = PasswordHasher::new(4).unwrap();
        let high = PasswordHasher::new(8).unwrap();
        let hash = high.hash("pw").unwrap();
        assert!(low.verify("pw", &hash));
    }

    #[test]
    fn test_out_of_range_cost_rejected() {
        assert!(PasswordHasher::new(MIN_HASH_COST - 1).is_err());
        assert!(PasswordHasher::new(MAX_HASH_COST + 1).is_err());
        assert!(hasher().hash_with_cost("pw", 40).is_err());
    }

    #[test]
    fn test_malformed_hashes_do_not_match() {
        let h = hasher();
        assert!(!h.verify("pw", ""));
        assert!(!h.verify("pw", "pw"));
        assert!(!h.verify("pw", "$2b$10$abcdefghijklmnopqrstuu"));
        assert!(!h.verify("pw", "$argon2id$v=19$m=oops$salt$digest"));
        assert!(!h.verify("pw", "$unknown$v=1$m=8,t=1,p=1$c2FsdHNhbHQ$ZGlnZXN0"));
    }

    #[test]
    fn test_memory_ceiling_enforced_on_verify() {
        let h = hasher();
        let hash = h.hash("pw").unwrap();
        let inflated = hash.replacen("m=8,", "m=4194304,", 1);
        assert!(!h.verify("pw", &inflated));
    }

    #[test]
    fn test_verify_dummy_does_not_panic() {
        hasher().verify_dummy("anything");
    }
}
