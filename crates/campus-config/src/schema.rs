// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema.
//!
//! ```yaml
//! api:
//!   host: 0.0.0.0
//!   port: 8000
//!   request_timeout_secs: 30
//!   cors:
//!     allowed_origins: ["http://localhost:3000"]
//! auth:
//!   jwt_secret: ${CAMPUS_JWT_SECRET}
//!   issuer: campus
//!   token_ttl_minutes: 60
//!   leeway_secs: 0
//!   algorithm: HS256
//!   hashing:
//!     memory_kib: 19456
//!     iterations: 2
//!     parallelism: 1
//! logging:
//!   level: info
//!   format: text
//! audit:
//!   enabled: true
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use campus_core::{Algorithm, HashingConfig, TokenConfig, MAX_TOKEN_TTL_SECS};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ConfigError, ConfigResult};

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 8000;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Longest accepted token lifetime in minutes.
pub const MAX_TOKEN_TTL_MINUTES: i64 = MAX_TOKEN_TTL_SECS / 60;

// =============================================================================
// CampusConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampusConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Token and password settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Audit trail settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl CampusConfig {
    /// Validates the configuration.
    ///
    /// A missing signing secret is not an error here; see
    /// [`AuthConfig::require_secret`].
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.auth.validate()?;
        Ok(())
    }

    /// Serializes the configuration as pretty JSON with secrets redacted.
    pub fn to_redacted_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::serialization(e.to_string()))
    }
}

// =============================================================================
// ApiConfig
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// CORS settings.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_api_port(),
            request_timeout_secs: default_request_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Returns the socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Validates the API configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "api.request_timeout_secs",
                "cannot be zero",
            ));
        }
        Ok(())
    }
}

/// CORS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Empty disables CORS headers; `"*"` allows any.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allow credentials.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Preflight max age in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: false,
            max_age_secs: default_max_age(),
        }
    }
}

// =============================================================================
// AuthConfig
// =============================================================================

/// Token and password hashing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret.
    #[serde(default)]
    pub jwt_secret: Option<SecretValue>,

    /// Token issuer.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Token lifetime in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,

    /// Clock skew tolerance in seconds.
    #[serde(default)]
    pub leeway_secs: u64,

    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: JwtAlgorithm,

    /// Argon2 cost parameters.
    #[serde(default)]
    pub hashing: HashingConfig,
}

fn default_issuer() -> String {
    "campus".to_string()
}

fn default_token_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_MINUTES
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: default_issuer(),
            token_ttl_minutes: default_token_ttl(),
            leeway_secs: 0,
            algorithm: JwtAlgorithm::default(),
            hashing: HashingConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the auth configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.token_ttl_minutes <= 0 {
            return Err(ConfigError::validation(
                "auth.token_ttl_minutes",
                "must be positive",
            ));
        }
        if self.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(ConfigError::validation(
                "auth.token_ttl_minutes",
                format!("must not exceed {} (30 days)", MAX_TOKEN_TTL_MINUTES),
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::validation("auth.issuer", "cannot be empty"));
        }
        if let Some(secret) = &self.jwt_secret {
            if secret.expose().is_empty() {
                return Err(ConfigError::validation("auth.jwt_secret", "cannot be empty"));
            }
        }
        if self.hashing.iterations == 0 || self.hashing.parallelism == 0 {
            return Err(ConfigError::validation(
                "auth.hashing",
                "iterations and parallelism must be at least 1",
            ));
        }
        Ok(())
    }

    /// Fails unless a signing secret is configured.
    pub fn require_secret(&self) -> ConfigResult<&SecretValue> {
        self.jwt_secret.as_ref().ok_or_else(|| {
            ConfigError::validation(
                "auth.jwt_secret",
                "a signing secret is required (set CAMPUS_JWT_SECRET or use --dev-mode)",
            )
        })
    }

    /// Returns the token lifetime in seconds.
    pub fn ttl_secs(&self) -> ConfigResult<i64> {
        self.token_ttl_minutes
            .checked_mul(60)
            .filter(|secs| (1..=MAX_TOKEN_TTL_SECS).contains(secs))
            .ok_or_else(|| {
                ConfigError::validation(
                    "auth.token_ttl_minutes",
                    format!("must be between 1 and {}", MAX_TOKEN_TTL_MINUTES),
                )
            })
    }

    /// Builds the token service configuration.
    pub fn token_config(&self) -> ConfigResult<TokenConfig> {
        let secret = self.require_secret()?;
        Ok(TokenConfig {
            secret: secret.expose().to_string(),
            issuer: self.issuer.clone(),
            ttl_secs: self.ttl_secs()?,
            leeway_secs: self.leeway_secs,
            algorithm: self.algorithm.into(),
        })
    }
}

/// Supported signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// A secret string.
///
/// Never printed by `Debug` and serialized as a redaction marker.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

// =============================================================================
// LoggingConfig / AuditConfig
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON lines.
    Json,
}

/// Audit trail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Emit audit events on the `audit` tracing target.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
