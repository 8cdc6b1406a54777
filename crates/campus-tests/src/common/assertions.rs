// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Response assertions.

use axum::http::header;

use super::harness::TestResponse;

impl TestResponse {
    /// Asserts the status code.
    #[track_caller]
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "unexpected status, body: {}",
            self.body
        );
        self
    }

    /// Asserts an error response with the given code.
    #[track_caller]
    pub fn assert_error(&self, status: u16, code: &str) -> &Self {
        self.assert_status(status);
        assert_eq!(self.body["error"]["code"], code, "body: {}", self.body);
        self
    }

    /// Asserts the error message.
    #[track_caller]
    pub fn assert_message(&self, message: &str) -> &Self {
        assert_eq!(self.body["error"]["message"], message, "body: {}", self.body);
        self
    }

    /// Asserts a 401 carrying a bearer challenge.
    #[track_caller]
    pub fn assert_unauthorized(&self) -> &Self {
        self.assert_error(401, "UNAUTHORIZED");
        let challenge = self
            .headers
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok());
        assert_eq!(challenge, Some("Bearer"));
        self
    }

    /// Asserts a 403.
    #[track_caller]
    pub fn assert_forbidden(&self) -> &Self {
        self.assert_error(403, "FORBIDDEN")
    }

    /// Returns the body as an array.
    #[track_caller]
    pub fn array(&self) -> &Vec<serde_json::Value> {
        self.body.as_array().expect("body is a JSON array")
    }
}
