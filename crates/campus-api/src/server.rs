// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    routing::{get, post},
    Router,
};
use campus_core::{Role, SharedAuditLogger, TokenService};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, RoleLayer};
use crate::state::{AppState, AppStateBuilder};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let cors = create_cors_layer(&self.config);
        let auth = AuthLayer::new(self.state.gate.clone())
            .with_audit_logger(self.state.audit_logger.clone())
            .with_public_paths(self.config.public_paths.clone());

        let any_role = self.role_layer(&Role::ALL);
        let staff = self.role_layer(&Role::STAFF);

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(cors);

        Router::new()
            // Public
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/users/register", post(handlers::register))
            .route("/token", post(handlers::login))
            // Any authenticated role
            .route("/users/me", get(handlers::me).route_layer(any_role.clone()))
            .route(
                "/attendance/student/{student_id}",
                get(handlers::list_attendance).route_layer(any_role.clone()),
            )
            .route(
                "/marks/student/{student_id}",
                get(handlers::list_marks).route_layer(any_role),
            )
            // Staff only
            .route(
                "/attendance/mark",
                post(handlers::mark_attendance).route_layer(staff.clone()),
            )
            .route(
                "/marks/upload",
                post(handlers::upload_marks).route_layer(staff),
            )
            // Authentication wraps matched routes only, so unknown paths fall
            // through to a 404 with or without a token.
            .route_layer(auth)
            .fallback(not_found)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    fn role_layer(&self, roles: &[Role]) -> RoleLayer {
        RoleLayer::require(self.state.gate.clone(), roles)
            .with_audit_logger(self.state.audit_logger.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.addr();
        let listener = self
            .bind()
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;
        self.serve(listener, shutdown_signal).await
    }

    /// Binds the configured address without serving.
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.addr()).await
    }

    /// Serves requests on an already bound listener until `shutdown_signal`
    /// resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let router = self.router();
        let local_addr = listener.local_addr().unwrap_or_else(|_| self.addr());

        info!("Starting API server on {}", local_addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {}", uri.path()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// With no configured origins the layer emits no CORS headers, so browsers
/// refuse cross-origin calls.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let mut layer = CorsLayer::new()
        .max_age(cors.max_age)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if !cors.is_enabled() {
        return layer;
    }

    if cors.allows_any_origin() {
        layer = layer.allow_origin(Any);
        if cors.allow_credentials {
            tracing::warn!("CORS credentials cannot be combined with a wildcard origin; ignoring");
        }
        return layer;
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer = layer.allow_origin(AllowOrigin::list(origins));
    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
#[derive(Default)]
pub struct ApiServerBuilder {
    state_builder: AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the token service.
    pub fn token_service(mut self, tokens: Arc<TokenService>) -> Self {
        self.state_builder = self.state_builder.token_service(tokens);
        self
    }

    /// Sets the credential store.
    pub fn credential_store(mut self, store: Arc<dyn campus_core::CredentialStore>) -> Self {
        self.state_builder = self.state_builder.credential_store(store);
        self
    }

    /// Sets the password hasher.
    pub fn password_hasher(mut self, hasher: Arc<dyn campus_core::PasswordHasher>) -> Self {
        self.state_builder = self.state_builder.password_hasher(hasher);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: SharedAuditLogger) -> Self {
        self.state_builder = self.state_builder.audit_logger(logger);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use campus_core::{Argon2PasswordHasher, HashingConfig, TokenConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_server() -> ApiServer {
        let tokens = TokenService::new(TokenConfig::new("test-secret-key-that-is-long-enough!")).unwrap();
        let hasher = Argon2PasswordHasher::with_config(HashingConfig::fast()).unwrap();

        ApiServerBuilder::new()
            .token_service(Arc::new(tokens))
            .password_hasher(Arc::new(hasher))
            .build()
            .unwrap()
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn register(username: &str, role: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/users/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": username, "password": "pw", "role": role }).to_string(),
            ))
            .unwrap()
    }

    fn login(username: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", username, password)))
            .unwrap()
    }

    #[test]
    fn test_server_builder() {
        let server = test_server();
        assert_eq!(server.addr().port(), 8000);
        let _router = server.router();
    }

    #[test]
    fn test_server_builder_requires_tokens() {
        assert!(ApiServerBuilder::new().build().is_err());
    }

    #[test]
    fn test_cors_layer_variants() {
        let mut config = ApiConfig::default();
        let _ = create_cors_layer(&config);

        config.cors.allowed_origins = vec!["*".to_string()];
        config.cors.allow_credentials = true;
        let _ = create_cors_layer(&config);

        config.cors.allowed_origins = vec!["https://campus.example".to_string()];
        let _ = create_cors_layer(&config);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let router = test_server().router();
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_reports_components() {
        let router = test_server().router();
        let req = Request::builder().uri("/ready").body(Body::empty()).unwrap();

        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);
        assert_eq!(body["components"][0]["name"], "credential_store");
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let router = test_server().router();

        let (status, body) = send(&router, register("alice", "student")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["msg"], "user created");
        assert_eq!(body["user_id"], 1);

        let (status, body) = send(&router, register("alice", "student")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "DUPLICATE_USERNAME");

        let (status, body) = send(&router, login("alice", "pw")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["expires_in"], 3600);
        assert!(body["access_token"].as_str().is_some());

        let (status, body) = send(&router, login("alice", "wrong")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Incorrect username or password");
    }

    #[tokio::test]
    async fn test_invalid_role_rejected() {
        let router = test_server().router();

        let (status, body) = send(&router, register("mallory", "superuser")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ROLE");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let router = test_server().router();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/users/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let router = test_server().router();
        let req = Request::builder()
            .uri("/attendance/student/1")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_student_cannot_mark_attendance() {
        let router = test_server().router();
        send(&router, register("alice", "student")).await;
        let (_, body) = send(&router, login("alice", "pw")).await;
        let token = body["access_token"].as_str().unwrap().to_string();

        let req = Request::builder()
            .method(Method::POST)
            .uri("/attendance/mark?student_id=1&status=present")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Operation not permitted");
    }

    #[tokio::test]
    async fn test_invalid_attendance_status() {
        let router = test_server().router();
        send(&router, register("tom", "teacher")).await;
        let (_, body) = send(&router, login("tom", "pw")).await;
        let token = body["access_token"].as_str().unwrap().to_string();

        let req = Request::builder()
            .method(Method::POST)
            .uri("/attendance/mark?student_id=1&status=late")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_me_returns_principal() {
        let router = test_server().router();
        send(&router, register("tom", "teacher")).await;
        let (_, body) = send(&router, login("tom", "pw")).await;
        let token = body["access_token"].as_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/users/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "tom");
        assert_eq!(body["role"], "teacher");
        assert!(body.get("password_verifier").is_none());
    }
}
