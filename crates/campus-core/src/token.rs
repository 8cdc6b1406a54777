// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access token issuance and validation.
//!
//! Tokens are HMAC-signed JWTs. Signature, structure and required claims are
//! checked by `jsonwebtoken`; expiry is checked here against an injected
//! [`Clock`] so it can be tested without sleeping.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::claims::Claims;
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, CoreResult};
use crate::identity::Identity;

pub use jsonwebtoken::Algorithm;

/// Default token lifetime: 60 minutes.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Longest accepted token lifetime: 30 days.
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

// =============================================================================
// TokenConfig
// =============================================================================

/// Token service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer, written to and required in every token.
    pub issuer: String,
    /// Token lifetime in seconds.
    pub ttl_secs: i64,
    /// Clock skew tolerance in seconds applied to `exp`.
    pub leeway_secs: u64,
    /// HMAC algorithm used for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by the operator
            issuer: "campus".to_string(),
            ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            leeway_secs: 0,
            algorithm: Algorithm::HS256,
        }
    }
}

impl TokenConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the default token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.num_seconds();
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Returns the default token lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_secs)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.secret.is_empty() {
            return Err(CoreError::internal("Token signing secret is not configured"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("Token signing secret is shorter than recommended (32 bytes)");
        }
        if self.ttl_secs <= 0 {
            return Err(CoreError::internal("Token lifetime must be positive"));
        }
        if self.ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(CoreError::internal(format!(
                "Token lifetime must not exceed {} seconds",
                MAX_TOKEN_TTL_SECS
            )));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(CoreError::internal(format!(
                "Unsupported token algorithm {:?}: only HS256, HS384 and HS512 are supported",
                self.algorithm
            )));
        }
        Ok(())
    }
}

// =============================================================================
// IssuedToken
// =============================================================================

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded token string.
    pub token: String,
    /// The claims embedded in the token.
    pub claims: Claims,
}

impl IssuedToken {
    /// Returns the lifetime of the token in seconds.
    pub fn expires_in(&self) -> i64 {
        self.claims.exp - self.claims.iat
    }
}

// =============================================================================
// TokenService
// =============================================================================

/// Issues and validates access tokens.
///
/// Created once at startup with the process-wide signing secret and shared
/// behind an `Arc`; it holds no mutable state.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<TokenConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a token service using the system clock.
    pub fn new(config: TokenConfig) -> CoreResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a token service with a custom clock.
    pub fn with_clock(config: TokenConfig, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
            clock,
        })
    }

    /// Issues a token for `identity`.
    ///
    /// `ttl` overrides the configured lifetime when given.
    pub fn issue(&self, identity: &Identity, ttl: Option<Duration>) -> CoreResult<IssuedToken> {
        let ttl = ttl.unwrap_or_else(|| self.config.ttl());
        let claims = Claims::for_identity(identity, self.clock.now(), ttl)
            .with_issuer(&self.config.issuer);

        let token = self.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Signs arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> CoreResult<String> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|e| CoreError::internal(format!("Failed to create token: {}", e)))
    }

    /// Validates a token and returns its claims.
    ///
    /// Every failure is reported as [`CoreError::InvalidToken`]; the cause is
    /// only logged.
    pub fn validate(&self, token: &str) -> CoreResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "Token rejected");
                CoreError::InvalidToken
            })?;

        if claims.is_expired_at(self.clock.now(), self.config.leeway_secs) {
            tracing::debug!(sub = %claims.sub, exp = claims.exp, "Token rejected: expired");
            return Err(CoreError::InvalidToken);
        }

        Ok(claims)
    }

    /// Returns the default token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.config.ttl_secs
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("ttl_secs", &self.config.ttl_secs)
            .finish()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            other => return Err(serde::ser::Error::custom(format!("Unsupported algorithm: {:?}", other))),
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
