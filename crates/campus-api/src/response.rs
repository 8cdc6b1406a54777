// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use campus_core::{Identity, IssuedToken, RecordId, Role, UserId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Health Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Service version.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Individual component status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// Account Responses
// =============================================================================

/// Body of a successful `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            expires_in: issued.expires_in(),
            access_token: issued.token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Body of a successful `POST /users/register`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub msg: String,
    pub user_id: UserId,
}

impl RegisterResponse {
    pub fn created(user_id: UserId) -> Self {
        Self {
            msg: "user created".to_string(),
            user_id,
        }
    }
}

/// Public view of an account. Never includes the password verifier.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub role: Role,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.id,
            username: identity.username.clone(),
            full_name: identity.display_name.clone(),
            role: identity.role,
        }
    }
}

// =============================================================================
// Record Responses
// =============================================================================

/// Body of a successful `POST /attendance/mark`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttendanceMarkedResponse {
    pub msg: String,
    pub attendance_id: RecordId,
}

impl AttendanceMarkedResponse {
    pub fn marked(attendance_id: RecordId) -> Self {
        Self {
            msg: "marked".to_string(),
            attendance_id,
        }
    }
}

/// Body of a successful `POST /marks/upload`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarksUploadedResponse {
    pub msg: String,
    pub marks_id: RecordId,
}

impl MarksUploadedResponse {
    pub fn uploaded(marks_id: RecordId) -> Self {
        Self {
            msg: "marks uploaded".to_string(),
            marks_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::PasswordVerifier;

    #[test]
    fn test_user_response_omits_verifier() {
        let identity = Identity {
            id: 3,
            username: "alice".to_string(),
            display_name: Some("Alice A".to_string()),
            password_verifier: PasswordVerifier::new("$argon2id$secret"),
            role: Role::Student,
        };

        let json = serde_json::to_value(UserResponse::from(&identity)).unwrap();
        assert_eq!(json["user_id"], 3);
        assert_eq!(json["role"], "student");
        assert_eq!(json["full_name"], "Alice A");
        assert!(!json.to_string().contains("argon2"));
    }
}
