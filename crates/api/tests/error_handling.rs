//! Tests for `AppError` → HTTP response mapping.
//!
//! The first group calls `IntoResponse` directly on `AppError` values; the
//! second drives the router with requests that fail.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{body_json, complete_fields, get, multipart_body, post_multipart};
use http_body_util::BodyExt;
use tarannum_api::error::AppError;
use tarannum_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with BAD_REQUEST code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("malformed multipart body".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "malformed multipart body");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400 with VALIDATION_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("style must not be blank".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "style must not be blank");
}

// ---------------------------------------------------------------------------
// Test: CoreError::UnknownChoice maps to 400 and names the field
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_choice_returns_400_with_field() {
    let err = AppError::Core(CoreError::UnknownChoice {
        field: "gender",
        value: "other".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Unknown gender value: 'other'");
}

// ---------------------------------------------------------------------------
// Test: errors raised by real requests use the same envelope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsupported_lang_query_returns_validation_error() {
    let app = common::build_test_app();
    let response = get(app.router, "/api/v1/form/choices?lang=fr").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Unknown locale value: 'fr'");
}

#[tokio::test]
async fn unsupported_lang_is_rejected_before_submitting() {
    let app = common::build_test_app();
    let body = multipart_body(&complete_fields(), Some(b"RIFF"));

    let response =
        post_multipart(app.router.clone(), "/api/v1/submissions?lang=xx", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(app.remote.call_count(), 0);
}

#[tokio::test]
async fn truncated_multipart_returns_bad_request() {
    let app = common::build_test_app();
    let body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nAli",
        common::BOUNDARY
    );

    let response =
        post_multipart(app.router.clone(), "/api/v1/submissions", body.into_bytes()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    assert_eq!(app.remote.call_count(), 0);
}
