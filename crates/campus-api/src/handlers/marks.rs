// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Marks handlers.

use axum::{extract::State, response::IntoResponse, Json};
use campus_core::{AuditEvent, MarkRecord, UserId};
use chrono::Utc;
use serde::Deserialize;

use super::attendance::ensure_may_view;
use crate::error::ApiResult;
use crate::extractors::{Auth, StudentIdPath, ValidatedQuery};
use crate::response::MarksUploadedResponse;
use crate::state::AppState;

/// GET /marks/student/{student_id}
///
/// Students may only list their own marks.
pub async fn list_marks(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    StudentIdPath(student_id): StudentIdPath,
) -> ApiResult<impl IntoResponse> {
    ensure_may_view(&state, &ctx, student_id, "Not permitted to view others' marks").await?;

    let records = state.marks.query_by_student_id(student_id).await?;
    Ok(Json(records))
}

/// Query parameters for `POST /marks/upload`.
#[derive(Debug, Deserialize)]
pub struct UploadMarksParams {
    pub student_id: UserId,
    pub subject: String,
    pub marks: i32,
}

/// POST /marks/upload
pub async fn upload_marks(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedQuery(params): ValidatedQuery<UploadMarksParams>,
) -> ApiResult<impl IntoResponse> {
    let record = MarkRecord {
        student_id: params.student_id,
        subject: params.subject,
        marks: params.marks,
        uploaded_by: ctx.user_id(),
        uploaded_at: Utc::now(),
    };
    let id = state.marks.insert(record).await?;

    state
        .audit(
            AuditEvent::record_written(ctx.user_id(), format!("marks:{}", id))
                .with_username(ctx.identity.username.clone())
                .with_request_id(ctx.request_id.to_string())
                .with_details(format!("student_id={}", params.student_id)),
        )
        .await;

    tracing::info!(
        marks_id = id,
        student_id = params.student_id,
        uploaded_by = ctx.user_id(),
        "Marks uploaded"
    );

    Ok(Json(MarksUploadedResponse::uploaded(id)))
}
