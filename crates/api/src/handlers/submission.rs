//! Handler for the `/submissions` resource.
//!
//! Accepts one recitation per request as `multipart/form-data` and runs it
//! through the submission workflow. Every workflow outcome, including remote
//! failures, comes back as a `{ "data": ... }` body carrying the status line
//! for the submitter.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tarannum_core::submission::{AudioInput, FormField, SubmissionForm};
use tarannum_core::workflow::SubmissionOutcome;

use crate::error::{AppError, AppResult};
use crate::handlers::form::LocaleQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a submission attempt.
#[derive(Debug, Serialize)]
pub struct SubmissionStatus {
    /// `saved`, `missing_audio`, `incomplete` or `failed`.
    pub outcome: &'static str,
    /// Localized status line.
    pub message: String,
    /// Uploaded audio id. Also set on failures that left the audio behind.
    pub artifact_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<FormField>,
}

/// POST /api/v1/submissions
///
/// Text parts: `name`, `gender`, `nationality`, `surah`, `ayat`, `style`.
/// File part: `audio`. Unknown parts are ignored. `?lang=` picks the
/// language of the status line; the ledger always uses the configured one.
///
/// Returns 201 when saved, 400 when the form is rejected before any remote
/// call, and 502 when a remote step failed.
pub async fn create_submission(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<SubmissionStatus>>)> {
    let locale = query.resolve(state.config.intake.locale)?;
    let form = read_form(multipart).await?;
    let outcome = state.workflow.submit(form).await;

    let status = match &outcome {
        SubmissionOutcome::Saved(_) => StatusCode::CREATED,
        SubmissionOutcome::MissingAudio | SubmissionOutcome::Incomplete(_) => {
            StatusCode::BAD_REQUEST
        }
        SubmissionOutcome::Failed(_) => StatusCode::BAD_GATEWAY,
    };

    let missing_fields = match &outcome {
        SubmissionOutcome::Incomplete(fields) => fields.clone(),
        _ => Vec::new(),
    };

    let body = SubmissionStatus {
        outcome: outcome.kind(),
        message: outcome.status_message(locale),
        artifact_id: outcome.artifact_id().map(str::to_string),
        missing_fields,
    };

    Ok((status, Json(DataResponse { data: body })))
}

async fn read_form(mut multipart: Multipart) -> AppResult<SubmissionForm> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(part) = field.name().map(str::to_string) else {
            continue;
        };

        if part == "audio" {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.audio = Some(AudioInput {
                file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let slot = match part.as_str() {
            "name" => &mut form.name,
            "nationality" => &mut form.nationality,
            "surah" => &mut form.surah,
            "ayat" => &mut form.ayat,
            "style" => &mut form.style,
            "gender" => form.gender.get_or_insert_with(String::new),
            other => {
                tracing::debug!(part = %other, "Ignoring unknown multipart field");
                continue;
            }
        };
        *slot = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    Ok(form)
}
