// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access token claims.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Identity, Role};

/// Claims carried by an access token.
///
/// `sub`, `role` and `exp` are required; a token without any of them fails to
/// decode and is treated as invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username.
    pub sub: String,

    /// Role at issuance. Authorization re-reads the role from the store.
    pub role: Role,

    /// Expiration time (Unix timestamp, seconds).
    pub exp: i64,

    /// Issued at time (Unix timestamp, seconds).
    #[serde(default)]
    pub iat: i64,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Creates claims for `identity`, issued at `now` and valid for `ttl`.
    pub fn for_identity(identity: &Identity, now: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            sub: identity.username.clone(),
            role: identity.role,
            exp: iat + ttl.num_seconds(),
            iat,
            iss: None,
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Returns the username this token was issued to.
    pub fn username(&self) -> &str {
        &self.sub
    }

    /// Returns `true` if the token has expired at `now`, allowing `leeway_secs`
    /// of clock skew.
    ///
    /// A token is still valid at exactly `exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_secs: u64) -> bool {
        let leeway = i64::try_from(leeway_secs).unwrap_or(i64::MAX);
        now.timestamp() > self.exp.saturating_add(leeway)
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PasswordVerifier;

    fn identity() -> Identity {
        Identity {
            id: 42,
            username: "alice".to_string(),
            display_name: None,
            password_verifier: PasswordVerifier::new("x"),
            role: Role::Student,
        }
    }

    #[test]
    fn test_claims_for_identity() {
        let now = Utc::now();
        let claims = Claims::for_identity(&identity(), now, Duration::minutes(60)).with_issuer("campus");

        assert_eq!(claims.username(), "alice");
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.iss.as_deref(), Some("campus"));
        assert_eq!(claims.expires_at().unwrap().timestamp(), claims.exp);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let claims = Claims::for_identity(&identity(), now, Duration::seconds(10));

        assert!(!claims.is_expired_at(now + Duration::seconds(10), 0));
        assert!(claims.is_expired_at(now + Duration::seconds(11), 0));
        assert!(!claims.is_expired_at(now + Duration::seconds(11), 5));
    }

    #[test]
    fn test_wire_format() {
        let claims = Claims::for_identity(&identity(), Utc::now(), Duration::minutes(1));
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["sub"], "alice");
        assert_eq!(value["role"], "student");
        assert!(value["exp"].is_i64());
        assert!(value.get("iss").is_none());
    }

    #[test]
    fn test_missing_required_claim_rejected() {
        let missing_role = serde_json::json!({ "sub": "alice", "exp": 1 });
        assert!(serde_json::from_value::<Claims>(missing_role).is_err());

        let unknown_role = serde_json::json!({ "sub": "alice", "role": "superuser", "exp": 1 });
        assert!(serde_json::from_value::<Claims>(unknown_role).is_err());
    }
}
