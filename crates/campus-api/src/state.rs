// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use campus_core::{
    AccessGate, Argon2PasswordHasher, AttendanceRecord, AttendanceStore, AuditEvent, Authenticator,
    CredentialStore, InMemoryCredentialStore, InMemoryRecordStore, MarkRecord, MarkStore,
    NoOpAuditLogger, PasswordHasher, Registrar, SharedAuditLogger, TokenService,
};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token issuing and validation.
    pub tokens: Arc<TokenService>,
    /// Token-to-identity resolution and role checks.
    pub gate: Arc<AccessGate>,
    /// Login credential checks.
    pub authenticator: Arc<Authenticator>,
    /// New account creation.
    pub registrar: Arc<Registrar>,
    /// Account storage.
    pub credentials: Arc<dyn CredentialStore>,
    /// Attendance records.
    pub attendance: AttendanceStore,
    /// Mark records.
    pub marks: MarkStore,
    /// Audit logger.
    pub audit_logger: SharedAuditLogger,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Records an audit event. Failures are logged and otherwise ignored.
    pub async fn audit(&self, event: AuditEvent) {
        if let Err(e) = self.audit_logger.log(event).await {
            tracing::warn!(
                error = %e,
                logger = self.audit_logger.name(),
                "Failed to record audit event"
            );
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .field("audit_logger", &self.audit_logger.name())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
///
/// Only the token service is required; everything else defaults to the
/// in-memory implementations.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    tokens: Option<Arc<TokenService>>,
    credentials: Option<Arc<dyn CredentialStore>>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    attendance: Option<AttendanceStore>,
    marks: Option<MarkStore>,
    audit_logger: Option<SharedAuditLogger>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token service.
    pub fn token_service(mut self, tokens: Arc<TokenService>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the credential store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Sets the password hasher.
    pub fn password_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Sets the attendance store.
    pub fn attendance_store(mut self, store: AttendanceStore) -> Self {
        self.attendance = Some(store);
        self
    }

    /// Sets the marks store.
    pub fn mark_store(mut self, store: MarkStore) -> Self {
        self.marks = Some(store);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: SharedAuditLogger) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> ApiResult<AppState> {
        let tokens = self
            .tokens
            .ok_or_else(|| ApiError::internal("token service is not configured"))?;

        let credentials: Arc<dyn CredentialStore> = self
            .credentials
            .unwrap_or_else(|| Arc::new(InMemoryCredentialStore::new()));
        let hasher: Arc<dyn PasswordHasher> = self
            .hasher
            .unwrap_or_else(|| Arc::new(Argon2PasswordHasher::new()));

        let authenticator = Authenticator::new(credentials.clone(), hasher.clone())?;
        let registrar = Registrar::new(credentials.clone(), hasher);
        let gate = AccessGate::new(tokens.clone(), credentials.clone());

        let attendance = self
            .attendance
            .unwrap_or_else(|| Arc::new(InMemoryRecordStore::<AttendanceRecord>::new()));
        let marks = self
            .marks
            .unwrap_or_else(|| Arc::new(InMemoryRecordStore::<MarkRecord>::new()));
        let audit_logger = self
            .audit_logger
            .unwrap_or_else(|| Arc::new(NoOpAuditLogger));

        Ok(AppState {
            config: Arc::new(self.config.unwrap_or_default()),
            tokens,
            gate: Arc::new(gate),
            authenticator: Arc::new(authenticator),
            registrar: Arc::new(registrar),
            credentials,
            attendance,
            marks,
            audit_logger,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<AccessGate> {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}
