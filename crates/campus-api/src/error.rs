// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every handler and middleware failure is an [`ApiError`], rendered as
//! `{"error": {"code": "...", "message": "..."}}` with the matching status.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use campus_core::{CoreError, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Malformed or invalid input (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Username already taken (400).
    #[error("Username already registered")]
    DuplicateUsername,

    /// Unknown role requested at registration (400).
    #[error("Invalid role")]
    InvalidRole,

    /// Login with wrong credentials (400).
    #[error("Incorrect username or password")]
    AuthenticationFailed,

    /// Missing, invalid or expired credentials (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// Authenticated but not permitted (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Service unavailable (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. }
            | ApiError::DuplicateUsername
            | ApiError::InvalidRole
            | ApiError::AuthenticationFailed => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::DuplicateUsername => "DUPLICATE_USERNAME",
            ApiError::InvalidRole => "INVALID_ROLE",
            ApiError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a message that is safe to show to clients.
    ///
    /// 401 responses always carry the same text whatever the cause.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::DuplicateUsername => "Username already registered".to_string(),
            ApiError::InvalidRole => "Invalid role".to_string(),
            ApiError::AuthenticationFailed => "Incorrect username or password".to_string(),
            ApiError::Unauthorized { .. } => "Could not validate credentials".to_string(),
            ApiError::Forbidden { message } => message.clone(),
            ApiError::ServiceUnavailable { .. } => "Service temporarily unavailable".to_string(),
            ApiError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::Internal { .. } | ApiError::ServiceUnavailable { .. }
        )
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message: self.user_message(),
            },
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DuplicateUsername { .. } => ApiError::DuplicateUsername,
            CoreError::InvalidRole { .. } => ApiError::InvalidRole,
            CoreError::Validation { message } => ApiError::bad_request(message),
            CoreError::AuthenticationFailed => ApiError::AuthenticationFailed,
            CoreError::InvalidToken | CoreError::Unauthenticated => {
                ApiError::unauthorized(err.to_string())
            }
            CoreError::Forbidden { reason } => ApiError::forbidden(reason),
            CoreError::Internal { message } => ApiError::internal(message),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        CoreError::from(err).into()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::not_found("route").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::DuplicateUsername.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AuthenticationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_error_mapping() {
        let cases = [
            (CoreError::duplicate_username("alice"), "DUPLICATE_USERNAME"),
            (CoreError::invalid_role("superuser"), "INVALID_ROLE"),
            (CoreError::validation("empty"), "BAD_REQUEST"),
            (CoreError::AuthenticationFailed, "AUTHENTICATION_FAILED"),
            (CoreError::InvalidToken, "UNAUTHORIZED"),
            (CoreError::Unauthenticated, "UNAUTHORIZED"),
            (CoreError::forbidden("no"), "FORBIDDEN"),
            (CoreError::internal("boom"), "INTERNAL_ERROR"),
        ];

        for (core, code) in cases {
            assert_eq!(ApiError::from(core).error_code(), code);
        }
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response = ApiError::unauthorized("expired").into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = ApiError::forbidden("no").into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_unauthorized_message_hides_cause() {
        let a = ApiError::from(CoreError::InvalidToken).user_message();
        let b = ApiError::from(CoreError::Unauthenticated).user_message();
        assert_eq!(a, b);
        assert_eq!(a, "Could not validate credentials");
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = ApiError::internal("database password is hunter2");
        assert_eq!(err.user_message(), "Internal server error");
    }
}
