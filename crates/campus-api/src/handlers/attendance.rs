// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Attendance handlers.

use axum::{extract::State, response::IntoResponse, Json};
use campus_core::{AttendanceRecord, AttendanceStatus, AuditEvent, RecordPolicy, UserId};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, StudentIdPath, ValidatedQuery};
use crate::response::AttendanceMarkedResponse;
use crate::state::AppState;

/// GET /attendance/student/{student_id}
///
/// Students may only list their own attendance.
pub async fn list_attendance(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    StudentIdPath(student_id): StudentIdPath,
) -> ApiResult<impl IntoResponse> {
    ensure_may_view(&state, &ctx, student_id, "Not permitted to view others' attendance").await?;

    let records = state.attendance.query_by_student_id(student_id).await?;
    Ok(Json(records))
}

/// Query parameters for `POST /attendance/mark`.
#[derive(Debug, Deserialize)]
pub struct MarkAttendanceParams {
    pub student_id: UserId,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// POST /attendance/mark
pub async fn mark_attendance(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedQuery(params): ValidatedQuery<MarkAttendanceParams>,
) -> ApiResult<impl IntoResponse> {
    let status: AttendanceStatus = params.status.parse()?;

    let record = AttendanceRecord {
        student_id: params.student_id,
        marked_by: ctx.user_id(),
        date: Utc::now(),
        status,
        note: params.note,
    };
    let id = state.attendance.insert(record).await?;

    state
        .audit(
            AuditEvent::record_written(ctx.user_id(), format!("attendance:{}", id))
                .with_username(ctx.identity.username.clone())
                .with_request_id(ctx.request_id.to_string())
                .with_details(format!("student_id={} status={}", params.student_id, status)),
        )
        .await;

    tracing::info!(
        attendance_id = id,
        student_id = params.student_id,
        marked_by = ctx.user_id(),
        "Attendance marked"
    );

    Ok(Json(AttendanceMarkedResponse::marked(id)))
}

/// Applies the record ownership rule, auditing and rejecting on denial.
pub(crate) async fn ensure_may_view(
    state: &AppState,
    ctx: &AuthContext,
    student_id: UserId,
    denial: &'static str,
) -> ApiResult<()> {
    if let Err(e) = RecordPolicy::check(&ctx.identity, student_id) {
        tracing::debug!(
            user_id = ctx.user_id(),
            student_id,
            reason = %e,
            "Record access denied"
        );

        let mut event = AuditEvent::access_denied(e.to_string())
            .with_user(ctx.user_id())
            .with_username(ctx.identity.username.clone())
            .with_resource(format!("student:{}", student_id))
            .with_request_id(ctx.request_id.to_string());
        if let Some(ip) = ctx.client_ip {
            event = event.with_client_ip(ip.to_string());
        }
        state.audit(event).await;

        return Err(ApiError::forbidden(denial));
    }

    Ok(())
}
