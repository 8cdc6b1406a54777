// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and expand `${VAR}` / `${VAR:default}` placeholders
//! 2. Parse YAML, TOML or JSON (chosen by extension)
//! 3. Apply `CAMPUS_*` environment overrides
//! 4. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! CAMPUS_API_HOST=0.0.0.0
//! CAMPUS_API_PORT=9000
//! CAMPUS_JWT_SECRET=...
//! CAMPUS_TOKEN_TTL_MINUTES=30
//! CAMPUS_LOG_LEVEL=debug
//! CAMPUS_LOG_FORMAT=json
//! CAMPUS_AUDIT_ENABLED=false
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{CampusConfig, LogFormat, LogLevel, SecretValue};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "CAMPUS";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader.
///
/// ```no_run
/// use campus_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("campus.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply environment overrides.
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format is picked by extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<CampusConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;

        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(&content)
        } else {
            content
        };

        let mut config: CampusConfig = parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })?;

        self.finish(&mut config)?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<CampusConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config = parse_str(&content, format)?;
        self.finish(&mut config)?;
        Ok(config)
    }

    /// Builds configuration from defaults and environment overrides only.
    pub fn load_defaults(&self) -> ConfigResult<CampusConfig> {
        debug!("No configuration file given, using defaults");
        let mut config = CampusConfig::default();
        self.finish(&mut config)?;
        Ok(config)
    }

    fn finish(&self, config: &mut CampusConfig) -> ConfigResult<()> {
        if self.resolve_env_vars {
            self.apply_env_overrides(config)?;
        }
        config.validate()
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// Unset variables without a default are left as written.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next(); // consume '{'

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (env::var(var_name), default_value) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        result
    }

    fn var(&self, suffix: &str) -> (String, Option<String>) {
        let name = format!("{}_{}", self.env_prefix, suffix);
        let value = env::var(&name).ok();
        (name, value)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut CampusConfig) -> ConfigResult<()> {
        if let (name, Some(value)) = self.var("API_HOST") {
            config.api.host = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected an IP address"))?;
        }
        if let (name, Some(value)) = self.var("API_PORT") {
            config.api.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
        }
        if let (_, Some(value)) = self.var("JWT_SECRET") {
            config.auth.jwt_secret = Some(SecretValue::new(value));
        }
        if let (name, Some(value)) = self.var("TOKEN_TTL_MINUTES") {
            config.auth.token_ttl_minutes = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected a number of minutes"))?;
        }
        if let (name, Some(value)) = self.var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected trace, debug, info, warn or error"))?;
        }
        if let (name, Some(value)) = self.var("LOG_FORMAT") {
            config.logging.format = match value.to_lowercase().as_str() {
                "text" | "pretty" => LogFormat::Text,
                "compact" => LogFormat::Compact,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::invalid_env_var(name, "expected text, compact or json")),
            };
        }
        if let (_, Some(value)) = self.var("AUDIT_ENABLED") {
            config.audit.enabled = parse_bool(&value);
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<CampusConfig> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

/// YAML parsing through the `config` crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<CampusConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Tests
// =============================================================================
