// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Turns a validated [`CampusConfig`] into the running service: token service,
//! password hasher, audit logger and the HTTP server, plus graceful shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use campus_api::{ApiServer, ApiServerBuilder};
use campus_config::{AuthConfig, CampusConfig, ConfigLoader};
use campus_core::{
    Argon2PasswordHasher, NoOpAuditLogger, SharedAuditLogger, TokenConfig, TokenService,
    TracingAuditLogger,
};
use tracing::{info, warn};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

/// Length of a generated development secret, in bytes.
const DEV_SECRET_LEN: usize = 32;

// =============================================================================
// CampusRuntime
// =============================================================================

/// The service runtime.
pub struct CampusRuntime {
    config: Arc<CampusConfig>,
    shutdown: ShutdownCoordinator,
    dev_mode: bool,
}

impl CampusRuntime {
    /// Creates a new runtime.
    pub fn new(config: CampusConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
            dev_mode: false,
        }
    }

    /// Enables development mode.
    pub fn with_dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Builds the HTTP server from configuration.
    pub fn build_server(&self) -> BinResult<ApiServer> {
        let token_config = token_config(&self.config.auth, self.dev_mode)?;
        let tokens = TokenService::new(token_config).map_err(BinError::InvalidToken)?;

        let hasher = Argon2PasswordHasher::with_config(self.config.auth.hashing)
            .map_err(BinError::InvalidHashing)?;

        let server = ApiServerBuilder::new()
            .config(api_config(&self.config.api))
            .token_service(Arc::new(tokens))
            .password_hasher(Arc::new(hasher))
            .audit_logger(self.audit_logger())
            .build()?;

        Ok(server)
    }

    fn audit_logger(&self) -> SharedAuditLogger {
        if self.config.audit.enabled {
            Arc::new(TracingAuditLogger)
        } else {
            info!("Audit logging disabled");
            Arc::new(NoOpAuditLogger)
        }
    }

    /// Runs the service until a shutdown signal arrives or the server fails.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting campus records service v{}", campus_core::VERSION);
        if self.dev_mode {
            warn!("Development mode enabled");
        }

        let server = self.build_server()?;
        let addr = server.addr();
        let listener = server
            .bind()
            .await
            .map_err(|source| BinError::Bind { addr, source })?;
        info!(
            addr = %addr,
            ttl_minutes = self.config.auth.token_ttl_minutes,
            "Service is ready"
        );

        let mut server_task = tokio::spawn(server.serve(listener, self.shutdown.shutdown_signal()));

        tokio::select! {
            joined = &mut server_task => {
                self.shutdown.initiate_shutdown();
                return flatten(joined);
            }
            _ = self.shutdown.wait_for_shutdown() => {}
        }

        info!("Shutdown initiated, draining connections");
        let result = flatten(server_task.await);
        info!("Campus records service stopped");
        result
    }
}

fn flatten(
    joined: Result<campus_api::ApiResult<()>, tokio::task::JoinError>,
) -> BinResult<()> {
    Ok(joined??)
}

// =============================================================================
// Component Construction
// =============================================================================

/// Builds the token configuration, generating an ephemeral secret in
/// development mode when none is configured.
pub fn token_config(auth: &AuthConfig, dev_mode: bool) -> BinResult<TokenConfig> {
    if auth.jwt_secret.is_some() {
        return Ok(auth.token_config()?);
    }
    if !dev_mode {
        return Err(BinError::MissingSecret);
    }

    warn!("No signing secret configured; using an ephemeral development secret");
    let mut auth = auth.clone();
    auth.jwt_secret = Some(campus_config::SecretValue::new(generate_dev_secret()?));
    Ok(auth.token_config()?)
}

/// Generates a random URL-safe secret.
pub fn generate_dev_secret() -> BinResult<String> {
    let mut bytes = [0u8; DEV_SECRET_LEN];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| BinError::Entropy(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Maps the file configuration onto the HTTP server configuration.
pub fn api_config(api: &campus_config::ApiConfig) -> campus_api::ApiConfig {
    let cors = campus_api::CorsConfig {
        allowed_origins: api.cors.allowed_origins.clone(),
        allow_credentials: api.cors.allow_credentials,
        max_age: Duration::from_secs(api.cors.max_age_secs),
    };

    campus_api::ApiConfig::default()
        .with_host(api.host)
        .with_port(api.port)
        .with_request_timeout(Duration::from_secs(api.request_timeout_secs))
        .with_cors(cors)
}

/// Loads configuration from `path`, or from defaults and the environment.
pub fn load_campus_config(path: Option<&Path>) -> BinResult<CampusConfig> {
    let loader = ConfigLoader::new();
    let config = match path {
        Some(path) => loader.load(path),
        None => loader.load_defaults(),
    };

    config.map_err(|source| match path {
        Some(path) => BinError::ConfigFile {
            path: path.to_path_buf(),
            source,
        },
        None => BinError::Config(source),
    })
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<CampusConfig>,
    dev_mode: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: Option<impl AsRef<Path>>) -> Self {
        self.config_path = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: CampusConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Enables development mode.
    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<CampusRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => load_campus_config(self.config_path.as_deref())?,
        };

        Ok(CampusRuntime::new(config).with_dev_mode(self.dev_mode))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use campus_config::SecretValue;
    use campus_core::HashingConfig;

    fn test_config() -> CampusConfig {
        let mut config = CampusConfig::default();
        config.auth.jwt_secret = Some(SecretValue::new("test-secret-key-that-is-long-enough!"));
        config.auth.hashing = HashingConfig::fast();
        config
    }

    #[test]
    fn test_runtime_builder() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .dev_mode(true)
            .build()
            .unwrap();

        assert!(runtime.dev_mode);
        assert!(!runtime.shutdown().is_shutdown_initiated());
    }

    #[test]
    fn test_missing_secret_fails_outside_dev_mode() {
        let auth = AuthConfig::default();
        let err = token_config(&auth, false).unwrap_err();
        assert!(matches!(err, BinError::MissingSecret));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_dev_mode_generates_secret() {
        let auth = AuthConfig::default();
        let first = token_config(&auth, true).unwrap();
        let second = token_config(&auth, true).unwrap();

        assert!(first.secret.len() >= DEV_SECRET_LEN);
        assert_ne!(first.secret, second.secret);
    }

    #[test]
    fn test_configured_secret_wins_in_dev_mode() {
        let config = test_config();
        let token = token_config(&config.auth, true).unwrap();
        assert_eq!(token.secret, "test-secret-key-that-is-long-enough!");
        assert_eq!(token.ttl_secs, 3600);
    }

    #[test]
    fn test_api_config_mapping() {
        let mut config = test_config();
        config.api.port = 9100;
        config.api.request_timeout_secs = 5;
        config.api.cors.allowed_origins = vec!["https://campus.example".to_string()];

        let api = api_config(&config.api);
        assert_eq!(api.port, 9100);
        assert_eq!(api.request_timeout, Duration::from_secs(5));
        assert_eq!(api.cors.allowed_origins.len(), 1);
        assert!(api.public_paths.contains(&"/users/register".to_string()));
    }

    #[test]
    fn test_load_campus_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.toml");
        std::fs::write(
            &path,
            "[auth]\njwt_secret = \"file-secret-that-is-long-enough-for-hs256\"\n",
        )
        .unwrap();

        let config = load_campus_config(Some(&path)).unwrap();
        assert!(config.auth.jwt_secret.is_some());

        let err = load_campus_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, BinError::ConfigFile { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().starts_with("Failed to load"));
    }

    #[test]
    fn test_build_server() {
        let runtime = CampusRuntime::new(test_config());
        let server = runtime.build_server().unwrap();
        assert_eq!(server.addr().port(), 8000);
    }

    #[test]
    fn test_invalid_hashing_params_rejected() {
        let mut config = test_config();
        config.auth.hashing.memory_kib = 1;
        let err = CampusRuntime::new(config).build_server().err().unwrap();
        assert!(matches!(err, BinError::InvalidHashing(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_port_in_use_reports_bind_error() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = test_config();
        config.api.host = "127.0.0.1".parse().unwrap();
        config.api.port = taken.local_addr().unwrap().port();

        let err = CampusRuntime::new(config).run().await.unwrap_err();
        assert!(matches!(err, BinError::Bind { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut config = test_config();
        config.api.port = 0;
        let runtime = CampusRuntime::new(config);
        let shutdown = runtime.shutdown().clone();

        let handle = tokio::spawn(runtime.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.initiate_shutdown();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runtime should stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
