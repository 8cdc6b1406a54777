// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity types: users, roles and password verifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Unique numeric user identifier assigned by the credential store.
pub type UserId = i64;

// =============================================================================
// Role
// =============================================================================

/// The closed set of roles known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May read only their own records.
    Student,
    /// May read any record and write attendance and marks.
    Teacher,
    /// Same record rights as a teacher.
    Admin,
}

impl Role {
    /// All roles, in privilege order.
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];

    /// Roles allowed to write attendance and marks.
    pub const STAFF: [Role; 2] = [Role::Teacher, Role::Admin];

    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Parses a role from its wire name.
    ///
    /// Matching is exact: `"Teacher"` or `"superuser"` are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Returns `true` if this role may see every student's records.
    pub fn is_staff(&self) -> bool {
        match self {
            Role::Teacher | Role::Admin => true,
            Role::Student => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| CoreError::invalid_role(s))
    }
}

// =============================================================================
// PasswordVerifier
// =============================================================================

/// One-way password verifier (a PHC-formatted hash string).
///
/// The value is opaque to everything except the password hasher and is never
/// printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordVerifier(String);

impl PasswordVerifier {
    /// Wraps an encoded verifier string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded verifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordVerifier(***)")
    }
}

// =============================================================================
// Identity
// =============================================================================

/// A registered user.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Store-assigned unique id.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Password verifier.
    pub password_verifier: PasswordVerifier,
    /// Role, fixed at creation.
    pub role: Role,
}

impl Identity {
    /// Returns `true` if the identity has one of the given roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// Input for creating an identity in a credential store.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Unique login name.
    pub username: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Password verifier produced by a password hasher.
    pub password_verifier: PasswordVerifier,
    /// Role.
    pub role: Role,
}

impl NewIdentity {
    /// Creates a new identity input.
    pub fn new(username: impl Into<String>, password_verifier: PasswordVerifier, role: Role) -> Self {
        Self {
            username: username.into(),
            display_name: None,
            password_verifier,
            role,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("student"), Some(Role::Student));
        assert_eq!(Role::parse("teacher"), Some(Role::Teacher));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("Admin"), None);
        assert!(matches!("superuser".parse::<Role>(), Err(CoreError::InvalidRole { .. })));
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::Student);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_role_staff() {
        assert!(!Role::Student.is_staff());
        assert!(Role::Teacher.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn test_verifier_debug_is_redacted() {
        let verifier = PasswordVerifier::new("$argon2id$v=19$secret");
        assert_eq!(format!("{:?}", verifier), "PasswordVerifier(***)");
    }
}
