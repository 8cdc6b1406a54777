// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # campus-bin
//!
//! Command-line entry point for the campus records service.
//!
//! Parses arguments, loads configuration, initializes logging and runs the
//! HTTP server until a shutdown signal arrives.
//!
//! ## Modules
//!
//! - [`cli`]: argument parsing
//! - [`commands`]: subcommand implementations
//! - [`runtime`]: component wiring and the server lifecycle
//! - [`shutdown`]: signal handling

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{report_error, report_error_and_exit, BinError, BinResult};
pub use runtime::{CampusRuntime, RuntimeBuilder};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
