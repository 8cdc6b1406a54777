// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pre-built configuration and identities.

use campus_core::{
    Argon2PasswordHasher, HashingConfig, Identity, PasswordVerifier, Role, TokenConfig, UserId,
};

/// Signing secret shared by every test application.
pub const TEST_SECRET: &str = "test-secret-key-for-token-signing-at-least-32-chars";

/// Password used by [`TestApp::register_and_login`](crate::common::TestApp::register_and_login).
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Token configuration with the test secret and default lifetime.
pub fn test_token_config() -> TokenConfig {
    TokenConfig::new(TEST_SECRET)
}

/// A hasher with minimal cost parameters.
pub fn fast_hasher() -> Argon2PasswordHasher {
    Argon2PasswordHasher::with_config(HashingConfig::fast()).expect("fast hashing config is valid")
}

/// An identity that exists only in memory, for minting tokens directly.
pub fn detached_identity(id: UserId, username: &str, role: Role) -> Identity {
    Identity {
        id,
        username: username.to_string(),
        display_name: None,
        password_verifier: PasswordVerifier::new("$argon2id$unused"),
        role,
    }
}

/// Minimal YAML configuration accepted by the loader.
pub const MINIMAL_YAML: &str = r#"
auth:
  jwt_secret: "yaml-secret-key-that-is-long-enough-for-hs256"
"#;

/// A fuller YAML configuration.
pub const FULL_YAML: &str = r#"
api:
  host: "127.0.0.1"
  port: 9100
  request_timeout_secs: 10
  cors:
    allowed_origins:
      - "https://campus.example"
auth:
  jwt_secret: "yaml-secret-key-that-is-long-enough-for-hs256"
  issuer: "campus-test"
  token_ttl_minutes: 30
logging:
  level: debug
  format: json
audit:
  enabled: false
"#;
