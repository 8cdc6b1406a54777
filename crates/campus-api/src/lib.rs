// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # campus-api
//!
//! HTTP API for the campus records service.
//!
//! Routes are gated in two layers: [`middleware::AuthLayer`] resolves the
//! bearer token to a stored identity, and [`middleware::RoleLayer`] checks the
//! route's permitted roles. Record reads additionally apply
//! [`campus_core::RecordPolicy`] inside the handler.

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::AuthContext;
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
