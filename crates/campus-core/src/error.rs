// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the campus core.
//!
//! Every business outcome of the core is an explicit variant of [`CoreError`].
//! Token failures are deliberately collapsed into [`CoreError::InvalidToken`]
//! and credential failures into [`CoreError::AuthenticationFailed`] so callers
//! cannot learn which check rejected them.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for storage collaborators.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// CoreError
// =============================================================================

/// Errors produced by the authentication and authorization core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The username is already registered.
    #[error("Username already registered: {username}")]
    DuplicateUsername {
        /// The rejected username.
        username: String,
    },

    /// The role is not one of the supported roles.
    #[error("Invalid role: {role}")]
    InvalidRole {
        /// The rejected role string.
        role: String,
    },

    /// Input failed basic validation (empty username, empty password, ...).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },

    /// Bad username or password. Never says which.
    #[error("Incorrect username or password")]
    AuthenticationFailed,

    /// The token could not be verified (bad signature, malformed, expired, ...).
    #[error("Invalid token")]
    InvalidToken,

    /// The caller is not logged in, or the token no longer maps to a user.
    #[error("Could not validate credentials")]
    Unauthenticated,

    /// The caller is authenticated but may not perform this operation.
    #[error("Operation not permitted: {reason}")]
    Forbidden {
        /// Why access was denied.
        reason: String,
    },

    /// Unexpected collaborator failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl CoreError {
    /// Creates a duplicate username error.
    pub fn duplicate_username(username: impl Into<String>) -> Self {
        Self::DuplicateUsername {
            username: username.into(),
        }
    }

    /// Creates an invalid role error.
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole { role: role.into() }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the error code for categorization.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::DuplicateUsername { .. } => "DUPLICATE_USERNAME",
            CoreError::InvalidRole { .. } => "INVALID_ROLE",
            CoreError::Validation { .. } => "VALIDATION_ERROR",
            CoreError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            CoreError::InvalidToken => "INVALID_TOKEN",
            CoreError::Unauthenticated => "UNAUTHENTICATED",
            CoreError::Forbidden { .. } => "FORBIDDEN",
            CoreError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` for the 401-class outcomes ("re-authenticate").
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, CoreError::InvalidToken | CoreError::Unauthenticated)
    }

    /// Returns `true` for the 403-class outcome ("you may not do this").
    pub fn is_forbidden(&self) -> bool {
        matches!(self, CoreError::Forbidden { .. })
    }

    /// Returns `true` if this error is a collaborator failure rather than a
    /// business outcome.
    pub fn is_internal(&self) -> bool {
        matches!(self, CoreError::Internal { .. })
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Errors reported by storage collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same unique key already exists.
    #[error("Duplicate username: {username}")]
    DuplicateUsername {
        /// The conflicting username.
        username: String,
    },

    /// The backing store could not be reached or failed.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername { username } => CoreError::DuplicateUsername { username },
            StoreError::Unavailable { message } => CoreError::Internal { message },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
