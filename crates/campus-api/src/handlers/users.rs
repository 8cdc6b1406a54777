// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account handlers.

use axum::{extract::State, response::IntoResponse, Json};
use campus_core::{AuditEvent, Registration};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{Auth, ClientIp, ValidatedJson};
use crate::response::{RegisterResponse, UserResponse};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// One of `student`, `teacher`, `admin`.
    pub role: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// POST /users/register
pub async fn register(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut registration = Registration::new(request.username, request.password, request.role);
    if let Some(full_name) = request.full_name {
        registration = registration.with_display_name(full_name);
    }

    let identity = state.registrar.register(registration).await?;

    let mut event = AuditEvent::register(identity.id, identity.username.clone());
    if let Some(ip) = client_ip {
        event = event.with_client_ip(ip.to_string());
    }
    state.audit(event).await;

    tracing::info!(user_id = identity.id, role = %identity.role, "User registered");

    Ok(Json(RegisterResponse::created(identity.id)))
}

/// GET /users/me
pub async fn me(Auth(ctx): Auth) -> impl IntoResponse {
    Json(UserResponse::from(&ctx.identity))
}
