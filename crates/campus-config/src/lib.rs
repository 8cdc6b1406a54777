// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # campus-config
//!
//! Configuration management for the campus records service.
//!
//! - **Schema**: `api`, `auth`, `logging` and `audit` sections with defaults
//! - **Multi-Format Support**: YAML, TOML and JSON files
//! - **Environment Overrides**: `CAMPUS_*` variables and `${VAR:default}`
//!   placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use campus_config::load_config;
//!
//! let config = load_config("campus.yaml").unwrap();
//! println!("Listening on {}", config.api.socket_addr());
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, ConfigFormat, ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    ApiConfig, AuditConfig, AuthConfig, CampusConfig, CorsConfig, JwtAlgorithm, LogFormat,
    LogLevel, LoggingConfig, SecretValue,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
