// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password login.

use axum::{extract::State, response::IntoResponse, Json};
use campus_core::AuditEvent;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ClientIp, ValidatedForm};
use crate::response::TokenResponse;
use crate::state::AppState;

/// Login form, `application/x-www-form-urlencoded`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /token
///
/// Exchanges a username and password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> ApiResult<impl IntoResponse> {
    let client_ip = client_ip.map(|ip| ip.to_string());

    let Some(identity) = state
        .authenticator
        .authenticate(&form.username, &form.password)
        .await?
    else {
        let mut event = AuditEvent::login_failed(form.username.clone());
        if let Some(ip) = client_ip {
            event = event.with_client_ip(ip);
        }
        state.audit(event).await;

        tracing::debug!(username = %form.username, "Login rejected");
        return Err(ApiError::AuthenticationFailed);
    };

    let issued = state.tokens.issue(&identity, None)?;

    let mut event = AuditEvent::login(identity.id, identity.username.clone());
    if let Some(ip) = client_ip {
        event = event.with_client_ip(ip);
    }
    state.audit(event).await;

    tracing::info!(user_id = identity.id, "User logged in");

    Ok(Json(TokenResponse::from(issued)))
}
