// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing.
//!
//! Verifiers are Argon2id PHC strings with a random 16-byte salt. Verification
//! goes through `argon2`'s constant-time comparison and fails closed on any
//! verifier it cannot parse.

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::identity::PasswordVerifier;

/// One-way password hash and verify primitive.
pub trait PasswordHasher: Send + Sync {
    /// Produces a salted verifier for `plaintext`.
    fn hash(&self, plaintext: &str) -> CoreResult<PasswordVerifier>;

    /// Returns `true` only if `plaintext` matches `verifier`.
    ///
    /// Malformed verifiers return `false`.
    fn verify(&self, plaintext: &str, verifier: &PasswordVerifier) -> bool;
}

/// Hashes `plaintext` on the blocking pool.
///
/// Argon2 is deliberately slow and memory hungry, so it never runs on an
/// async worker thread.
pub async fn hash_off_runtime(
    hasher: Arc<dyn PasswordHasher>,
    plaintext: String,
) -> CoreResult<PasswordVerifier> {
    tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
        .await
        .map_err(|e| CoreError::internal(format!("Password hashing task failed: {}", e)))?
}

/// Verifies `plaintext` against `verifier` on the blocking pool.
pub async fn verify_off_runtime(
    hasher: Arc<dyn PasswordHasher>,
    plaintext: String,
    verifier: PasswordVerifier,
) -> CoreResult<bool> {
    tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &verifier))
        .await
        .map_err(|e| CoreError::internal(format!("Password verification task failed: {}", e)))
}

// =============================================================================
// HashingConfig
// =============================================================================

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashingConfig {
    /// Minimal cost, for tests only.
    pub fn fast() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST.max(8),
            iterations: 1,
            parallelism: 1,
        }
    }
}

// =============================================================================
// Argon2PasswordHasher
// =============================================================================

/// Argon2id password hasher.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with the default Argon2 parameters.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Creates a hasher with custom cost parameters.
    pub fn with_config(config: HashingConfig) -> CoreResult<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| CoreError::internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> CoreResult<PasswordVerifier> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| CoreError::internal(format!("Failed to generate salt: {}", e)))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| CoreError::internal(format!("Failed to encode salt: {}", e)))?;

        let phc = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CoreError::internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(PasswordVerifier::new(phc))
    }

    fn verify(&self, plaintext: &str, verifier: &PasswordVerifier) -> bool {
        // Cost parameters come from the PHC string, not from self.params.
        match PasswordHash::new(verifier.as_str()) {
            Ok(parsed) => self
                .argon2()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
