// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User registration.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::identity::{Identity, NewIdentity, Role};
use crate::password::{hash_off_runtime, PasswordHasher};
use crate::store::CredentialStore;

/// Registration input as received from a client.
///
/// `role` is kept as a raw string; it is parsed during registration so an
/// unknown role is reported as [`CoreError::InvalidRole`].
#[derive(Debug, Clone)]
pub struct Registration {
    /// Desired username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Requested role name.
    pub role: String,
    /// Optional display name.
    pub display_name: Option<String>,
}

impl Registration {
    /// Creates a registration request without a display name.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
            display_name: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Creates identities.
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl Registrar {
    /// Creates a registrar.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Registers a new identity.
    ///
    /// Input and role are validated before the password is hashed or the
    /// store is touched.
    pub async fn register(&self, registration: Registration) -> CoreResult<Identity> {
        if registration.username.trim().is_empty() {
            return Err(CoreError::validation("username must not be empty"));
        }
        if registration.password.is_empty() {
            return Err(CoreError::validation("password must not be empty"));
        }
        let role: Role = registration.role.parse()?;

        let verifier = hash_off_runtime(self.hasher.clone(), registration.password).await?;
        let mut new_identity = NewIdentity::new(registration.username, verifier, role);
        new_identity.display_name = registration.display_name;

        let identity = self.store.create(new_identity).await?;
        tracing::info!(user_id = identity.id, role = %identity.role, "User registered");
        Ok(identity)
    }
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::{Argon2PasswordHasher, HashingConfig};
    use crate::store::InMemoryCredentialStore;

    fn registrar() -> (Registrar, InMemoryCredentialStore) {
        let store = InMemoryCredentialStore::new();
        let hasher = Argon2PasswordHasher::with_config(HashingConfig::fast()).unwrap();
        (Registrar::new(Arc::new(store.clone()), Arc::new(hasher)), store)
    }

    #[tokio::test]
    async fn test_register() {
        let (registrar, store) = registrar();

        let identity = registrar
            .register(Registration::new("alice", "pw1", "student").with_display_name("Alice A."))
            .await
            .unwrap();

        assert_eq!(identity.id, 1);
        assert_eq!(identity.role, Role::Student);
        assert_eq!(identity.display_name.as_deref(), Some("Alice A."));
        assert_ne!(identity.password_verifier.as_str(), "pw1");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let (registrar, _) = registrar();

        registrar
            .register(Registration::new("alice", "pw1", "student"))
            .await
            .unwrap();
        let result = registrar
            .register(Registration::new("alice", "other", "teacher"))
            .await;

        assert!(matches!(result, Err(CoreError::DuplicateUsername { .. })));
    }

    #[tokio::test]
    async fn test_reregistration_cannot_change_role() {
        let (registrar, store) = registrar();

        let first = registrar
            .register(Registration::new("alice", "pw1", "student"))
            .await
            .unwrap();
        let _ = registrar
            .register(Registration::new("alice", "pw1", "admin"))
            .await;

        let stored = store.find_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Student);
        assert_eq!(stored.password_verifier, first.password_verifier);
    }

    #[tokio::test]
    async fn test_invalid_role_leaves_store_unchanged() {
        let (registrar, store) = registrar();

        let result = registrar
            .register(Registration::new("mallory", "pw", "superuser"))
            .await;

        assert!(matches!(result, Err(CoreError::InvalidRole { ref role }) if role == "superuser"));
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.find_by_username("mallory").await.unwrap().is_none());
    }

    /// Records the thread every hash runs on.
    struct ThreadRecordingHasher {
        inner: Argon2PasswordHasher,
        threads: parking_lot::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl PasswordHasher for ThreadRecordingHasher {
        fn hash(&self, plaintext: &str) -> CoreResult<crate::identity::PasswordVerifier> {
            self.threads.lock().push(std::thread::current().id());
            self.inner.hash(plaintext)
        }

        fn verify(&self, plaintext: &str, verifier: &crate::identity::PasswordVerifier) -> bool {
            self.inner.verify(plaintext, verifier)
        }
    }

    #[tokio::test]
    async fn test_hashing_runs_on_blocking_pool() {
        let hasher = Arc::new(ThreadRecordingHasher {
            inner: Argon2PasswordHasher::with_config(HashingConfig::fast()).unwrap(),
            threads: parking_lot::Mutex::new(Vec::new()),
        });
        let registrar = Registrar::new(Arc::new(InMemoryCredentialStore::new()), hasher.clone());

        registrar
            .register(Registration::new("alice", "pw1", "student"))
            .await
            .unwrap();

        let threads = hasher.threads.lock().clone();
        assert_eq!(threads.len(), 1);
        assert_ne!(threads[0], std::thread::current().id());
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let (registrar, store) = registrar();

        let result = registrar.register(Registration::new("  ", "pw", "student")).await;
        assert!(matches!(result, Err(CoreError::Validation { .. })));

        let result = registrar.register(Registration::new("bob", "", "student")).await;
        assert!(matches!(result, Err(CoreError::Validation { .. })));

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
