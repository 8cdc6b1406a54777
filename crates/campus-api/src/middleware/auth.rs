// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use campus_core::{AccessGate, AuditEvent, NoOpAuditLogger, SharedAuditLogger};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for bearer token authentication.
///
/// Non-public requests must carry `Authorization: Bearer <token>`. The token
/// is resolved through the [`AccessGate`] and the resulting [`AuthContext`]
/// is stored in the request extensions.
#[derive(Clone)]
pub struct AuthLayer {
    gate: Arc<AccessGate>,
    audit: SharedAuditLogger,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(gate: Arc<AccessGate>) -> Self {
        Self {
            gate,
            audit: Arc::new(NoOpAuditLogger),
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Sets the audit logger for rejected requests.
    pub fn with_audit_logger(mut self, audit: SharedAuditLogger) -> Self {
        self.audit = audit;
        self
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A trailing `*` matches any path with that prefix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with default public paths.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(crate::config::default_public_paths())
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            gate: self.gate.clone(),
            audit: self.audit.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer token authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    gate: Arc<AccessGate>,
    audit: SharedAuditLogger,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public_path| {
            public_path
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let audit = self.audit.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_public {
                return inner.call(req).await;
            }

            let request_id = Uuid::now_v7();
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());
            let path = req.uri().path().to_string();

            let Some(token) = extract_bearer_token(&req) else {
                tracing::debug!(path = %path, "No authorization token provided");
                return Ok(ApiError::unauthorized("No authorization token provided").into_response());
            };

            match gate.authenticate(&token).await {
                Ok(identity) => {
                    let mut auth_ctx = AuthContext::new(identity).with_request_id(request_id);
                    if let Some(ip) = client_ip {
                        auth_ctx = auth_ctx.with_client_ip(ip);
                    }
                    req.extensions_mut().insert(auth_ctx);
                    inner.call(req).await
                }
                Err(e) if e.is_internal() => {
                    tracing::error!(error = %e, "Credential lookup failed");
                    Ok(ApiError::from(e).into_response())
                }
                Err(e) => {
                    tracing::debug!(error = %e, path = %path, "Token rejected");

                    let mut event = AuditEvent::access_denied(e.to_string())
                        .with_resource(path)
                        .with_request_id(request_id.to_string());
                    if let Some(ip) = client_ip {
                        event = event.with_client_ip(ip.to_string());
                    }
                    if let Err(err) = audit.log(event).await {
                        tracing::warn!(error = %err, "Failed to record audit event");
                    }

                    Ok(ApiError::from(e).into_response())
                }
            }
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
///
/// The scheme name is case-insensitive (RFC 7235).
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use campus_core::{
        AuditAction, CredentialStore, InMemoryAuditLogger, InMemoryCredentialStore, NewIdentity,
        PasswordVerifier, Role, TokenConfig, TokenService,
    };
    use std::convert::Infallible;
    use tower::ServiceExt;

    fn mock_service(
    ) -> impl Service<Request<Body>, Response = Response, Error = Infallible, Future = impl Future<Output = Result<Response, Infallible>> + Send>
           + Clone
           + Send {
        tower::service_fn(|req: Request<Body>| async move {
            let status = if req.extensions().get::<AuthContext>().is_some() {
                StatusCode::OK
            } else {
                StatusCode::NO_CONTENT
            };
            let mut response = Response::new(Body::empty());
            *response.status_mut() = status;
            Ok::<_, Infallible>(response)
        })
    }

    async fn setup() -> (AuthLayer, Arc<TokenService>, InMemoryCredentialStore, InMemoryAuditLogger) {
        let store = InMemoryCredentialStore::new();
        store
            .create(NewIdentity::new("alice", PasswordVerifier::new("x"), Role::Student))
            .await
            .unwrap();

        let tokens = Arc::new(TokenService::new(TokenConfig::new("test-secret-key-for-testing-only!")).unwrap());
        let gate = Arc::new(AccessGate::new(tokens.clone(), Arc::new(store.clone())));
        let audit = InMemoryAuditLogger::new();
        let layer = AuthLayer::new(gate)
            .with_audit_logger(Arc::new(audit.clone()))
            .with_default_public_paths();

        (layer, tokens, store, audit)
    }

    fn request(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        if let Some(value) = auth {
            req.headers_mut()
                .insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        req
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut req = request("/test", None);
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        for value in ["bearer tok", "BEARER tok", "bEaReR  tok "] {
            let req = request("/test", Some(value));
            assert_eq!(extract_bearer_token(&req), Some("tok".to_string()), "{}", value);
        }

        for value in ["Bearertok", "Bearer", "Token tok"] {
            let req = request("/test", Some(value));
            assert!(extract_bearer_token(&req).is_none(), "{}", value);
        }
    }

    #[tokio::test]
    async fn test_public_paths() {
        let (layer, _, _, _) = setup().await;
        let layer = layer.with_public_paths(vec!["/health".to_string(), "/docs/*".to_string()]);
        let middleware = layer.layer(mock_service());

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/docs/index.html"));
        assert!(!middleware.is_public_path("/attendance/student/1"));
    }

    #[tokio::test]
    async fn test_public_path_skips_auth() {
        let (layer, _, _, _) = setup().await;
        let mut service = layer.layer(mock_service());

        let response = service
            .ready()
            .await
            .unwrap()
            .call(request("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (layer, _, _, _) = setup().await;
        let mut service = layer.layer(mock_service());

        let response = service
            .ready()
            .await
            .unwrap()
            .call(request("/users/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    }

    #[tokio::test]
    async fn test_valid_token_inserts_context() {
        let (layer, tokens, store, _) = setup().await;
        let alice = store.find_by_username("alice").await.unwrap().unwrap();
        let issued = tokens.issue(&alice, None).unwrap();
        let mut service = layer.layer(mock_service());

        let header = format!("Bearer {}", issued.token);
        let response = service
            .ready()
            .await
            .unwrap()
            .call(request("/users/me", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejected_token_is_audited() {
        let (layer, _, _, audit) = setup().await;
        let mut service = layer.layer(mock_service());

        let response = service
            .ready()
            .await
            .unwrap()
            .call(request("/users/me", Some("Bearer not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let denied = audit.entries_for_action(AuditAction::AccessDenied);
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].resource.as_deref(), Some("/users/me"));
    }
}
