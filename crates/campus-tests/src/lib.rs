// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Campus Integration Tests
//!
//! Shared fixtures and an in-process test application for exercising the
//! campus records service end to end.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p campus-tests
//! cargo test -p campus-tests --test integration_api
//! cargo test -p campus-tests --test integration_config
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use campus_tests::common::TestApp;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let (alice, token) = app.register_and_login("alice", "student").await;
//!     let response = app.get(&format!("/attendance/student/{}", alice), Some(&token)).await;
//!     response.assert_status(200);
//! }
//! ```

pub mod common;
