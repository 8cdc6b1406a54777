// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # campus-core
//!
//! Authentication and authorization core for the campus records service.
//!
//! - **Identity**: users, the closed [`Role`] set, password verifiers
//! - **Password**: Argon2id hashing and constant-time verification
//! - **Store**: the [`CredentialStore`] trait and an in-memory implementation
//! - **Token**: signed, time-bounded access tokens with an injected [`Clock`]
//! - **Authenticator / Registrar**: login and registration
//! - **Gate**: token + required roles -> authorized identity
//! - **Policy**: student ownership rule for attendance and marks
//! - **Records**: attendance and mark records and their stores
//! - **Audit**: security audit trail
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use campus_core::{
//!     AccessGate, Argon2PasswordHasher, InMemoryCredentialStore, Registrar,
//!     Registration, Role, TokenConfig, TokenService,
//! };
//!
//! let store = Arc::new(InMemoryCredentialStore::new());
//! let hasher = Arc::new(Argon2PasswordHasher::new());
//! let tokens = Arc::new(TokenService::new(TokenConfig::new(secret))?);
//!
//! let alice = Registrar::new(store.clone(), hasher)
//!     .register(Registration::new("alice", "pw1", "student"))
//!     .await?;
//! let token = tokens.issue(&alice, None)?.token;
//!
//! let gate = AccessGate::new(tokens, store);
//! let principal = gate.authorize(&token, &Role::ALL).await?;
//! ```

#![deny(unsafe_code)]

pub mod audit;
pub mod authenticator;
pub mod claims;
pub mod clock;
pub mod error;
pub mod gate;
pub mod identity;
pub mod password;
pub mod policy;
pub mod records;
pub mod registration;
pub mod store;
pub mod token;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::{
    AuditAction, AuditError, AuditEvent, AuditLogger, AuditResult, InMemoryAuditLogger,
    NoOpAuditLogger, SharedAuditLogger, TracingAuditLogger,
};
pub use authenticator::Authenticator;
pub use claims::Claims;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, StoreError, StoreResult};
pub use gate::AccessGate;
pub use identity::{Identity, NewIdentity, PasswordVerifier, Role, UserId};
pub use password::{
    hash_off_runtime, verify_off_runtime, Argon2PasswordHasher, HashingConfig, PasswordHasher,
};
pub use policy::RecordPolicy;
pub use records::{
    AttendanceRecord, AttendanceStatus, AttendanceStore, InMemoryRecordStore, MarkRecord,
    MarkStore, RecordId, RecordStore, Stored, StudentRecord,
};
pub use registration::{Registrar, Registration};
pub use store::{CredentialStore, InMemoryCredentialStore};
pub use token::{
    Algorithm, IssuedToken, TokenConfig, TokenService, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
