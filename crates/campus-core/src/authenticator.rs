// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Username and password authentication.

use std::sync::Arc;

use crate::error::CoreResult;
use crate::identity::{Identity, PasswordVerifier};
use crate::password::{verify_off_runtime, PasswordHasher};
use crate::store::CredentialStore;

/// Checks credentials against the credential store.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    dummy_verifier: Arc<PasswordVerifier>,
}

impl Authenticator {
    /// Creates an authenticator.
    ///
    /// Hashes a throwaway password once so unknown usernames cost the same
    /// verification work as known ones.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> CoreResult<Self> {
        let dummy_verifier = hasher.hash("campus-dummy-password")?;
        Ok(Self {
            store,
            hasher,
            dummy_verifier: Arc::new(dummy_verifier),
        })
    }

    /// Returns the identity when `password` matches, `None` otherwise.
    ///
    /// An unknown username and a wrong password both yield `None`. Store
    /// failures are returned as errors.
    pub async fn authenticate(&self, username: &str, password: &str) -> CoreResult<Option<Identity>> {
        let identity = self.store.find_by_username(username).await?;

        match identity {
            Some(identity) => {
                let matches = verify_off_runtime(
                    self.hasher.clone(),
                    password.to_string(),
                    identity.password_verifier.clone(),
                )
                .await?;
                if matches {
                    tracing::debug!(user_id = identity.id, "Credentials accepted");
                    Ok(Some(identity))
                } else {
                    Ok(None)
                }
            }
            None => {
                let _ = verify_off_runtime(
                    self.hasher.clone(),
                    password.to_string(),
                    (*self.dummy_verifier).clone(),
                )
                .await?;
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
