// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access control gate.
//!
//! Turns a bearer token and a set of permitted roles into an authorized
//! [`Identity`], or into [`CoreError::Unauthenticated`] /
//! [`CoreError::Forbidden`].
//!
//! The identity is always re-read from the credential store: the role in the
//! token is informational only, so a role change or removal in the store takes
//! effect on the next request.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::identity::{Identity, Role};
use crate::store::CredentialStore;
use crate::token::TokenService;

/// Authenticates tokens and enforces role membership.
#[derive(Clone)]
pub struct AccessGate {
    tokens: Arc<TokenService>,
    store: Arc<dyn CredentialStore>,
}

impl AccessGate {
    /// Creates a gate.
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn CredentialStore>) -> Self {
        Self { tokens, store }
    }

    /// Resolves the principal behind `token`.
    pub async fn authenticate(&self, token: &str) -> CoreResult<Identity> {
        let claims = self
            .tokens
            .validate(token)
            .map_err(|_| CoreError::Unauthenticated)?;

        match self.store.find_by_username(&claims.sub).await? {
            Some(identity) => Ok(identity),
            None => {
                tracing::debug!(sub = %claims.sub, "Token subject no longer exists");
                Err(CoreError::Unauthenticated)
            }
        }
    }

    /// Checks that `identity` holds one of `roles`.
    pub fn require_role(&self, identity: &Identity, roles: &[Role]) -> CoreResult<()> {
        if identity.has_any_role(roles) {
            Ok(())
        } else {
            Err(CoreError::forbidden(format!(
                "role '{}' is not permitted for this operation",
                identity.role
            )))
        }
    }

    /// Authenticates `token` and requires one of `roles`.
    pub async fn authorize(&self, token: &str, roles: &[Role]) -> CoreResult<Identity> {
        let identity = self.authenticate(token).await?;
        self.require_role(&identity, roles)?;
        Ok(identity)
    }

    /// Returns the token service behind this gate.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::clock::ManualClock;
    use crate::identity::{NewIdentity, PasswordVerifier};
    use crate::store::InMemoryCredentialStore;
    use crate::token::TokenConfig;

    struct Fixture {
        gate: AccessGate,
        store: InMemoryCredentialStore,
        tokens: Arc<TokenService>,
        clock: ManualClock,
    }

    fn fixture() -> Fixture {
        let clock = ManualClock::starting_now();
        let tokens = Arc::new(
            TokenService::with_clock(
                TokenConfig::new("gate-test-secret-0123456789abcdef"),
                Arc::new(clock.clone()),
            )
            .unwrap(),
        );
        let store = InMemoryCredentialStore::new();
        let gate = AccessGate::new(tokens.clone(), Arc::new(store.clone()));
        Fixture {
            gate,
            store,
            tokens,
            clock,
        }
    }

    async fn add(store: &InMemoryCredentialStore, username: &str, role: Role) -> Identity {
        store
            .create(NewIdentity::new(username, PasswordVerifier::new("x"), role))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_student_authorized_for_all_roles() {
        let f = fixture();
        for i in 1..42 {
            add(&f.store, &format!("filler{}", i), Role::Student).await;
        }
        let student = add(&f.store, "s42", Role::Student).await;
        assert_eq!(student.id, 42);

        let token = f.tokens.issue(&student, None).unwrap().token;
        let identity = f.gate.authorize(&token, &Role::ALL).await.unwrap();
        assert_eq!(identity.id, 42);
    }

    #[tokio::test]
    async fn test_student_forbidden_for_staff_routes() {
        let f = fixture();
        let student = add(&f.store, "alice", Role::Student).await;
        let token = f.tokens.issue(&student, None).unwrap().token;

        let result = f.gate.authorize(&token, &Role::STAFF).await;
        assert!(matches!(result, Err(CoreError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_teacher_authorized_for_staff_routes() {
        let f = fixture();
        let teacher = add(&f.store, "tom", Role::Teacher).await;
        let token = f.tokens.issue(&teacher, None).unwrap().token;

        let identity = f.gate.authorize(&token, &Role::STAFF).await.unwrap();
        assert_eq!(identity.role, Role::Teacher);
    }

    #[tokio::test]
    async fn test_invalid_and_expired_tokens_are_unauthenticated() {
        let f = fixture();
        let student = add(&f.store, "alice", Role::Student).await;
        let token = f
            .tokens
            .issue(&student, Some(Duration::minutes(60)))
            .unwrap()
            .token;

        let result = f.gate.authorize("garbage", &Role::ALL).await;
        assert!(matches!(result, Err(CoreError::Unauthenticated)));

        f.clock.advance(Duration::minutes(61));
        let result = f.gate.authorize(&token, &Role::ALL).await;
        assert!(matches!(result, Err(CoreError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_deleted_user_is_unauthenticated() {
        let f = fixture();
        let student = add(&f.store, "alice", Role::Student).await;
        let token = f.tokens.issue(&student, None).unwrap().token;

        assert!(f.store.remove("alice"));
        let result = f.gate.authenticate(&token).await;
        assert!(matches!(result, Err(CoreError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_store_role_is_authoritative() {
        let f = fixture();
        let teacher = add(&f.store, "tom", Role::Teacher).await;
        let token = f.tokens.issue(&teacher, None).unwrap().token;

        assert!(f.gate.authorize(&token, &Role::STAFF).await.is_ok());

        f.store.set_role("tom", Role::Student);
        let result = f.gate.authorize(&token, &Role::STAFF).await;
        assert!(matches!(result, Err(CoreError::Forbidden { .. })));
    }
}
