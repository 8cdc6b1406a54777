// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the campus binary.
//!
//! Each variant maps to its own process exit code so scripts can tell a bad
//! configuration apart from a port that is already taken.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for campus-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the campus binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration did not load or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] campus_config::ConfigError),

    /// A named configuration file could not be loaded.
    #[error("Failed to load {}: {source}", .path.display())]
    ConfigFile {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: campus_config::ConfigError,
    },

    /// No token signing secret outside development mode.
    #[error("No signing secret configured; set auth.jwt_secret or CAMPUS_JWT_SECRET, or pass --dev-mode")]
    MissingSecret,

    /// The token service rejected its configuration.
    #[error("Invalid token settings: {0}")]
    InvalidToken(#[source] campus_core::CoreError),

    /// Argon2 rejected the configured hashing parameters.
    #[error("Invalid password hashing parameters: {0}")]
    InvalidHashing(#[source] campus_core::CoreError),

    /// The operating system could not supply random bytes.
    #[error("Failed to gather randomness: {0}")]
    Entropy(String),

    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// The address that was requested.
        addr: SocketAddr,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error.
    #[error("Server error: {0}")]
    Server(#[from] campus_api::ApiError),

    /// The server task panicked or was cancelled.
    #[error("Server task failed: {0}")]
    ServerTask(#[from] tokio::task::JoinError),

    /// Password hashing failed in `hash-password`.
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] campus_core::CoreError),

    /// Rejected command line input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Command output could not be rendered.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BinError {
    /// Creates an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::ConfigFile { .. } => 1,
            Self::MissingSecret => 2,
            Self::InvalidToken(_) | Self::InvalidHashing(_) => 3,
            Self::Bind { .. } => 4,
            Self::Server(_) | Self::ServerTask(_) => 5,
            Self::Entropy(_) | Self::Hashing(_) => 6,
            Self::InvalidInput(_) => 64,
            Self::Output(_) | Self::Io(_) => 74,
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints an error and its cause chain to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the matching code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_config::ConfigError;
    use campus_core::CoreError;

    #[test]
    fn test_missing_secret_message() {
        let err = BinError::MissingSecret;
        assert!(err.to_string().contains("CAMPUS_JWT_SECRET"));
        assert!(err.to_string().contains("--dev-mode"));
    }

    #[test]
    fn test_config_file_keeps_source() {
        let err = BinError::ConfigFile {
            path: PathBuf::from("/etc/campus.toml"),
            source: ConfigError::validation("auth.token_ttl_minutes", "must be positive"),
        };
        assert!(err.to_string().starts_with("Failed to load /etc/campus.toml"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_bind_error_names_address() {
        let err = BinError::Bind {
            addr: "127.0.0.1:8000".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().starts_with("Failed to bind 127.0.0.1:8000"));
    }

    #[test]
    fn test_exit_codes() {
        let config = ConfigError::validation("auth.jwt_secret", "missing");
        assert_eq!(BinError::from(config).exit_code(), 1);
        assert_eq!(BinError::MissingSecret.exit_code(), 2);
        assert_eq!(BinError::InvalidToken(CoreError::internal("x")).exit_code(), 3);
        assert_eq!(BinError::InvalidHashing(CoreError::internal("x")).exit_code(), 3);
        assert_eq!(
            BinError::Bind {
                addr: "0.0.0.0:80".parse().unwrap(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }
            .exit_code(),
            4
        );
        assert_eq!(BinError::from(campus_api::ApiError::internal("x")).exit_code(), 5);
        assert_eq!(BinError::from(CoreError::internal("x")).exit_code(), 6);
        assert_eq!(BinError::invalid_input("empty").exit_code(), 64);
        assert_eq!(BinError::from(std::io::Error::other("x")).exit_code(), 74);
    }
}
