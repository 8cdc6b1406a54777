// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the API server (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `hash-password`: Produce a password verifier

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Campus records service.
///
/// Role-gated attendance and marks API with bearer token authentication.
#[derive(Parser, Debug)]
#[command(
    name = "campus",
    author = "Sylvex <contact@sylvex.io>",
    version = campus_core::VERSION,
    about = "Role-gated campus records service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path (defaults and environment only when omitted)
    #[arg(short, long, env = "CAMPUS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "CAMPUS_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Hash a password with Argon2id
    ///
    /// Prints a PHC-format verifier suitable for seeding a credential store.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Enable development mode (generates an ephemeral signing secret when none is set)
    #[arg(long, env = "CAMPUS_DEV_MODE")]
    pub dev_mode: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration (secrets redacted) after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
    pub password: Option<String>,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub stdin: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<LogFormat> for campus_config::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Text => campus_config::LogFormat::Text,
            LogFormat::Json => campus_config::LogFormat::Json,
            LogFormat::Compact => campus_config::LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Resolves the log level: quiet and verbose flags win, then `-l`, then
    /// the configured level.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
        }
    }

    /// Resolves the log format, preferring the command line.
    pub fn effective_log_format(&self, configured: campus_config::LogFormat) -> campus_config::LogFormat {
        self.log_format.map(Into::into).unwrap_or(configured)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["campus"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run(_)));
    }

    #[test]
    fn test_run_dev_mode() {
        let cli = Cli::parse_from(["campus", "run", "--dev-mode"]);
        match cli.command {
            Some(Commands::Run(args)) => assert!(args.dev_mode),
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["campus", "validate", "--show-config", "-f", "json"]);
        match cli.command {
            Some(Commands::Validate(args)) => {
                assert!(args.show_config);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("Expected Validate command, got {:?}", other),
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["campus", "-c", "/etc/campus/config.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/campus/config.yaml")));
    }

    #[test]
    fn test_log_level_resolution() {
        let cli = Cli::parse_from(["campus"]);
        assert_eq!(cli.effective_log_level("error"), "error");

        let cli = Cli::parse_from(["campus", "-l", "trace"]);
        assert_eq!(cli.effective_log_level("error"), "trace");

        let cli = Cli::parse_from(["campus", "-q", "-l", "trace"]);
        assert_eq!(cli.effective_log_level("info"), "warn");

        let cli = Cli::parse_from(["campus", "-v"]);
        assert_eq!(cli.effective_log_level("info"), "debug");
    }

    #[test]
    fn test_log_format_resolution() {
        let cli = Cli::parse_from(["campus", "--log-format", "json"]);
        assert_eq!(
            cli.effective_log_format(campus_config::LogFormat::Text),
            campus_config::LogFormat::Json
        );
    }

    #[test]
    fn test_hash_password_command() {
        let cli = Cli::parse_from(["campus", "hash-password", "hunter2"]);
        match cli.command {
            Some(Commands::HashPassword(args)) => {
                assert_eq!(args.password.as_deref(), Some("hunter2"));
                assert!(!args.stdin);
            }
            other => panic!("Expected HashPassword command, got {:?}", other),
        }

        assert!(Cli::try_parse_from(["campus", "hash-password"]).is_err());
    }

    #[test]
    fn test_hash_password_sources_are_exclusive() {
        let cli = Cli::parse_from(["campus", "hash-password", "--stdin"]);
        match cli.command {
            Some(Commands::HashPassword(args)) => {
                assert!(args.stdin);
                assert!(args.password.is_none());
            }
            other => panic!("Expected HashPassword command, got {:?}", other),
        }

        let err = Cli::try_parse_from(["campus", "hash-password", "hunter2", "--stdin"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
