// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential store.
//!
//! The store owns identity lifetime. Implementations must make the username
//! uniqueness check and the insert a single atomic step.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::identity::{Identity, NewIdentity, UserId};

/// Persistence interface for identities.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Creates an identity, failing with [`StoreError::DuplicateUsername`] if
    /// the username is taken.
    async fn create(&self, identity: NewIdentity) -> StoreResult<Identity>;

    /// Looks up an identity by username.
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Identity>>;

    /// Looks up an identity by id.
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>>;

    /// Returns the number of registered identities.
    async fn count(&self) -> StoreResult<usize>;
}

// =============================================================================
// InMemoryCredentialStore
// =============================================================================

#[derive(Debug, Default)]
struct Inner {
    by_username: HashMap<String, Identity>,
    username_by_id: HashMap<UserId, String>,
    next_id: UserId,
}

/// In-memory credential store.
///
/// A single `RwLock` guards both indexes; `create` holds the write lock across
/// the uniqueness check and the insert.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Out-of-band mutators for exercising identity re-resolution in tests.
///
/// Roles are immutable once an identity is created, so these only exist in
/// test builds and behind the `test-support` feature.
#[cfg(any(test, feature = "test-support"))]
impl InMemoryCredentialStore {
    /// Replaces the role of an existing identity.
    pub fn set_role(&self, username: &str, role: crate::identity::Role) -> bool {
        let mut inner = self.inner.write();
        match inner.by_username.get_mut(username) {
            Some(identity) => {
                identity.role = role;
                true
            }
            None => false,
        }
    }

    /// Removes an identity. Returns `true` if it existed.
    pub fn remove(&self, username: &str) -> bool {
        let mut inner = self.inner.write();
        match inner.by_username.remove(username) {
            Some(identity) => {
                inner.username_by_id.remove(&identity.id);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, identity: NewIdentity) -> StoreResult<Identity> {
        let mut inner = self.inner.write();

        if inner.by_username.contains_key(&identity.username) {
            return Err(StoreError::DuplicateUsername {
                username: identity.username,
            });
        }

        inner.next_id += 1;
        let created = Identity {
            id: inner.next_id,
            username: identity.username,
            display_name: identity.display_name,
            password_verifier: identity.password_verifier,
            role: identity.role,
        };

        inner
            .username_by_id
            .insert(created.id, created.username.clone());
        inner
            .by_username
            .insert(created.username.clone(), created.clone());

        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Identity>> {
        Ok(self.inner.read().by_username.get(username).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        let inner = self.inner.read();
        Ok(inner
            .username_by_id
            .get(&id)
            .and_then(|username| inner.by_username.get(username))
            .cloned())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.inner.read().by_username.len())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{PasswordVerifier, Role};

    fn new_identity(username: &str, role: Role) -> NewIdentity {
        NewIdentity::new(username, PasswordVerifier::new("$argon2id$test"), role)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryCredentialStore::new();

        let alice = store
            .create(new_identity("alice", Role::Student).with_display_name("Alice"))
            .await
            .unwrap();
        let bob = store.create(new_identity("bob", Role::Teacher)).await.unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(found.display_name.as_deref(), Some("Alice"));

        let found = store.find_by_id(bob.id).await.unwrap().unwrap();
        assert_eq!(found.username, "bob");

        assert!(store.find_by_username("carol").await.unwrap().is_none());
        assert!(store.find_by_id(99).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let store = InMemoryCredentialStore::new();

        store.create(new_identity("alice", Role::Student)).await.unwrap();
        let result = store.create(new_identity("alice", Role::Admin)).await;

        assert!(matches!(result, Err(StoreError::DuplicateUsername { ref username }) if username == "alice"));
        assert_eq!(store.count().await.unwrap(), 1);

        let kept = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(kept.role, Role::Student);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_single_winner() {
        let store = InMemoryCredentialStore::new();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(new_identity("race", Role::Student)).await })
            })
            .collect();

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(StoreError::DuplicateUsername { .. }) => duplicates += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(duplicates, 15);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_role_and_remove() {
        let store = InMemoryCredentialStore::new();
        let created = store.create(new_identity("dave", Role::Teacher)).await.unwrap();

        assert!(store.set_role("dave", Role::Student));
        assert_eq!(
            store.find_by_username("dave").await.unwrap().unwrap().role,
            Role::Student
        );

        assert!(store.remove("dave"));
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
        assert!(!store.remove("dave"));
        assert!(!store.set_role("dave", Role::Admin));
    }
}
