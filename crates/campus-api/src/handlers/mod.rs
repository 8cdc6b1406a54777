// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness and readiness
//! - [`users`]: registration and the current principal
//! - [`token`]: password login
//! - [`attendance`] and [`marks`]: student records

mod attendance;
mod health;
mod marks;
mod token;
mod users;

pub use attendance::*;
pub use health::*;
pub use marks::*;
pub use token::*;
pub use users::*;
