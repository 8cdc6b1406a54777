// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-route role gate.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use campus_core::{AccessGate, AuditEvent, NoOpAuditLogger, Role, SharedAuditLogger};
use tower::{Layer, Service};

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// RoleLayer
// =============================================================================

/// Layer restricting a route to a set of roles.
///
/// Runs after [`AuthLayer`](super::AuthLayer); a request without an
/// [`AuthContext`] is rejected as unauthenticated.
#[derive(Clone)]
pub struct RoleLayer {
    gate: Arc<AccessGate>,
    allowed: Arc<[Role]>,
    audit: SharedAuditLogger,
}

impl RoleLayer {
    /// Creates a layer admitting any of `roles`.
    pub fn require(gate: Arc<AccessGate>, roles: &[Role]) -> Self {
        Self {
            gate,
            allowed: Arc::from(roles),
            audit: Arc::new(NoOpAuditLogger),
        }
    }

    /// Sets the audit logger for denied requests.
    pub fn with_audit_logger(mut self, audit: SharedAuditLogger) -> Self {
        self.audit = audit;
        self
    }
}

impl<S> Layer<S> for RoleLayer {
    type Service = RoleMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleMiddleware {
            inner,
            gate: self.gate.clone(),
            allowed: self.allowed.clone(),
            audit: self.audit.clone(),
        }
    }
}

// =============================================================================
// RoleMiddleware
// =============================================================================

/// Middleware enforcing role membership.
#[derive(Clone)]
pub struct RoleMiddleware<S> {
    inner: S,
    gate: Arc<AccessGate>,
    allowed: Arc<[Role]>,
    audit: SharedAuditLogger,
}

impl<S> Service<Request<Body>> for RoleMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let allowed = self.allowed.clone();
        let audit = self.audit.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(ctx) = req.extensions().get::<AuthContext>().cloned() else {
                tracing::warn!("No auth context found, denying access");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            };

            match gate.require_role(&ctx.identity, &allowed) {
                Ok(()) => inner.call(req).await,
                Err(e) => {
                    tracing::warn!(
                        user_id = ctx.user_id(),
                        role = %ctx.role(),
                        allowed = ?&*allowed,
                        "Role not permitted"
                    );

                    let mut event = AuditEvent::access_denied(e.to_string())
                        .with_user(ctx.user_id())
                        .with_username(ctx.identity.username.clone())
                        .with_resource(req.uri().path())
                        .with_request_id(ctx.request_id.to_string());
                    if let Some(ip) = ctx.client_ip {
                        event = event.with_client_ip(ip.to_string());
                    }
                    if let Err(err) = audit.log(event).await {
                        tracing::warn!(error = %err, "Failed to record audit event");
                    }

                    Ok(ApiError::forbidden("Operation not permitted").into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
