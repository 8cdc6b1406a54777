// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Mock collaborators.

use async_trait::async_trait;
use campus_core::{CredentialStore, Identity, NewIdentity, StoreError, StoreResult, UserId};

/// A credential store whose backend is always down.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn create(&self, _identity: NewIdentity) -> StoreResult<Identity> {
        Err(StoreError::unavailable("backend offline"))
    }

    async fn find_by_username(&self, _username: &str) -> StoreResult<Option<Identity>> {
        Err(StoreError::unavailable("backend offline"))
    }

    async fn find_by_id(&self, _id: UserId) -> StoreResult<Option<Identity>> {
        Err(StoreError::unavailable("backend offline"))
    }

    async fn count(&self) -> StoreResult<usize> {
        Err(StoreError::unavailable("backend offline"))
    }
}
