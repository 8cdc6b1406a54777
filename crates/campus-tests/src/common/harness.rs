// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! [`TestApp`] wires the real router to in-memory collaborators and a manual
//! clock, and drives it with `tower::ServiceExt::oneshot`. No socket is bound.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use campus_api::ApiServerBuilder;
use campus_core::{
    CredentialStore, InMemoryAuditLogger, InMemoryCredentialStore, ManualClock, TokenConfig,
    TokenService, UserId,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::fixtures::{fast_hasher, test_token_config, TEST_PASSWORD};

// =============================================================================
// TestResponse
// =============================================================================

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, or `Value::Null` when empty.
    pub body: Value,
}

// =============================================================================
// TestApp
// =============================================================================

/// An in-process campus service.
pub struct TestApp {
    router: Router,
    /// Clock driving token issuance and expiry.
    pub clock: ManualClock,
    /// Credential store, kept concrete so tests can mutate identities.
    pub store: Arc<InMemoryCredentialStore>,
    /// Every audit event the service recorded.
    pub audit: Arc<InMemoryAuditLogger>,
    /// The token service used by the router.
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    /// Creates an application with the default token configuration.
    pub fn new() -> Self {
        Self::with_token_config(test_token_config())
    }

    /// Creates an application with a custom token configuration.
    pub fn with_token_config(config: TokenConfig) -> Self {
        let clock = ManualClock::starting_now();
        let tokens = Arc::new(
            TokenService::with_clock(config, Arc::new(clock.clone()))
                .expect("test token config is valid"),
        );
        let store = Arc::new(InMemoryCredentialStore::new());
        let audit = Arc::new(InMemoryAuditLogger::new());

        let server = ApiServerBuilder::new()
            .token_service(tokens.clone())
            .credential_store(store.clone())
            .password_hasher(Arc::new(fast_hasher()))
            .audit_logger(audit.clone())
            .build()
            .expect("test server builds");

        Self {
            router: server.router(),
            clock,
            store,
            audit,
            tokens,
        }
    }

    /// Returns a clone of the router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Sends a request and buffers the response.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        send(&self.router, request).await
    }

    /// Sends a GET request.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(build(Method::GET, uri, token, Body::empty(), None)).await
    }

    /// Sends a body-less POST request.
    pub async fn post(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(build(Method::POST, uri, token, Body::empty(), None)).await
    }

    /// Registers a user.
    pub async fn register(&self, username: &str, password: &str, role: &str) -> TestResponse {
        self.request(register_request(username, password, role)).await
    }

    /// Requests a token.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.request(login_request(username, password)).await
    }

    /// Registers a user with [`TEST_PASSWORD`] and logs in.
    ///
    /// Returns the new user id and the bearer token.
    pub async fn register_and_login(&self, username: &str, role: &str) -> (UserId, String) {
        let registered = self.register(username, TEST_PASSWORD, role).await;
        assert_eq!(registered.status, StatusCode::OK, "register {}: {}", username, registered.body);
        let user_id = registered.body["user_id"]
            .as_i64()
            .expect("register returns a user id");

        let login = self.login(username, TEST_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "login {}: {}", username, login.body);
        let token = login.body["access_token"]
            .as_str()
            .expect("login returns a token")
            .to_string();

        (user_id, token)
    }

    /// Moves the token clock forward.
    pub fn advance_minutes(&self, minutes: i64) {
        self.clock.advance(chrono::Duration::minutes(minutes));
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a router backed by an arbitrary credential store.
pub fn router_with_store(store: Arc<dyn CredentialStore>) -> (Router, Arc<TokenService>) {
    let tokens = Arc::new(TokenService::new(test_token_config()).expect("test token config is valid"));
    let server = ApiServerBuilder::new()
        .token_service(tokens.clone())
        .credential_store(store)
        .password_hasher(Arc::new(fast_hasher()))
        .build()
        .expect("test server builds");
    (server.router(), tokens)
}

// =============================================================================
// Request Builders
// =============================================================================

/// Sends a request through `router` and buffers the response.
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    TestResponse { status, headers, body }
}

/// Builds a request with an optional bearer token.
pub fn build(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Body,
    content_type: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).expect("request is well formed")
}

/// `POST /users/register` with a JSON body.
pub fn register_request(username: &str, password: &str, role: &str) -> Request<Body> {
    let body = json!({ "username": username, "password": password, "role": role });
    build(
        Method::POST,
        "/users/register",
        None,
        Body::from(body.to_string()),
        Some("application/json"),
    )
}

/// `POST /token` with a form body.
pub fn login_request(username: &str, password: &str) -> Request<Body> {
    build(
        Method::POST,
        "/token",
        None,
        Body::from(format!("username={}&password={}", username, password)),
        Some("application/x-www-form-urlencoded"),
    )
}
