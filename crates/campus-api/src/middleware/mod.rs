// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthMiddleware`]: bearer token authentication
//! - [`RoleLayer`]: per-route role requirements

mod auth;
mod roles;

pub use auth::{AuthLayer, AuthMiddleware};
pub use roles::{RoleLayer, RoleMiddleware};
