// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Security audit trail.
//!
//! Registration, logins, gate denials and record writes are recorded as
//! [`AuditEvent`]s. Audit failures are logged by the caller and never fail a
//! request.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::identity::UserId;

/// Result type alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Audit sink errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink could not record the event.
    #[error("Audit sink failed: {0}")]
    Sink(String),
}

// =============================================================================
// Types
// =============================================================================

/// Audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A user was registered.
    Register,
    /// Successful login.
    Login,
    /// Failed login.
    LoginFailed,
    /// A request was rejected by the gate or the record policy.
    AccessDenied,
    /// An attendance or mark record was written.
    RecordWritten,
}

impl AuditAction {
    /// Returns the action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "register",
            AuditAction::Login => "login",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::AccessDenied => "access_denied",
            AuditAction::RecordWritten => "record_written",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique, time-ordered event id.
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    /// Acting user id, when known.
    pub user_id: Option<UserId>,
    /// Acting or attempted username, when known.
    pub username: Option<String>,
    /// Affected resource, e.g. `attendance:12`.
    pub resource: Option<String>,
    pub success: bool,
    pub details: Option<String>,
    pub request_id: Option<String>,
    pub client_ip: Option<String>,
}

impl AuditEvent {
    /// Creates an event for `action`.
    pub fn new(action: AuditAction, success: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            action,
            user_id: None,
            username: None,
            resource: None,
            success,
            details: None,
            request_id: None,
            client_ip: None,
        }
    }

    pub fn register(user_id: UserId, username: impl Into<String>) -> Self {
        Self::new(AuditAction::Register, true)
            .with_user(user_id)
            .with_username(username)
    }

    pub fn login(user_id: UserId, username: impl Into<String>) -> Self {
        Self::new(AuditAction::Login, true)
            .with_user(user_id)
            .with_username(username)
    }

    pub fn login_failed(username: impl Into<String>) -> Self {
        Self::new(AuditAction::LoginFailed, false).with_username(username)
    }

    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::new(AuditAction::AccessDenied, false).with_details(reason)
    }

    pub fn record_written(user_id: UserId, resource: impl Into<String>) -> Self {
        Self::new(AuditAction::RecordWritten, true)
            .with_user(user_id)
            .with_resource(resource)
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }
}

// =============================================================================
// AuditLogger
// =============================================================================

/// Audit sink.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Records an event.
    async fn log(&self, event: AuditEvent) -> AuditResult<()>;

    /// Returns the logger name.
    fn name(&self) -> &str {
        "audit_logger"
    }
}

/// Emits events as structured `tracing` records on the `audit` target.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditLogger;

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log(&self, event: AuditEvent) -> AuditResult<()> {
        tracing::info!(
            target: "audit",
            event_id = %event.id,
            action = %event.action,
            success = event.success,
            user_id = ?event.user_id,
            username = ?event.username,
            resource = ?event.resource,
            details = ?event.details,
            request_id = ?event.request_id,
            client_ip = ?event.client_ip,
            "audit"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

/// Discards all events.
#[derive(Debug, Default, Clone)]
pub struct NoOpAuditLogger;

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn log(&self, _event: AuditEvent) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Keeps events in memory. Intended for tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditLogger {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl InMemoryAuditLogger {
    /// Creates an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub fn entries(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Returns events for a specific action.
    pub fn entries_for_action(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, event: AuditEvent) -> AuditResult<()> {
        self.events.write().push(event);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Shared audit logger handle.
pub type SharedAuditLogger = Arc<dyn AuditLogger>;
