// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /health
///
/// Liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// Readiness check against the credential store.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = Vec::new();

    let credentials = match state.credentials.count().await {
        Ok(count) => ComponentStatus {
            name: "credential_store".to_string(),
            healthy: true,
            message: Some(format!("{} accounts", count)),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Credential store not ready");
            ComponentStatus {
                name: "credential_store".to_string(),
                healthy: false,
                message: Some("Credential store unavailable".to_string()),
            }
        }
    };
    components.push(credentials);

    components.push(ComponentStatus {
        name: "audit_logger".to_string(),
        healthy: true,
        message: Some(state.audit_logger.name().to_string()),
    });

    let ready = components.iter().all(|c| c.healthy);
    let response = ReadinessResponse { ready, components };

    if ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
