#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use tarannum_api::config::{IntakeConfig, RemoteBackend, ServerConfig};
use tarannum_api::router::build_app_router;
use tarannum_api::state::AppState;
use tarannum_core::i18n::Locale;
use tarannum_core::ledger::LedgerLocation;
use tarannum_core::memory::InMemoryRemote;

pub const BOUNDARY: &str = "tarannum-test-boundary";

/// Build a test `ServerConfig` on the in-memory backend.
///
/// Uses `http://localhost:5173` as CORS origin and stages audio under
/// `staging_dir`.
pub fn test_config(staging_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        intake: IntakeConfig {
            backend: RemoteBackend::Memory,
            google: None,
            audio_folder_id: "audio-folder".to_string(),
            ledger: LedgerLocation::new("metadata-folder"),
            record_gender: true,
            locale: Locale::En,
            staging_dir: staging_dir.to_path_buf(),
        },
    }
}

/// A router wired to an inspectable in-memory remote.
pub struct TestApp {
    pub router: Router,
    pub remote: Arc<InMemoryRemote>,
    pub staging: TempDir,
}

/// Build the full application router with all middleware layers.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Same as [`build_test_app`], letting the caller adjust the config first.
pub fn build_test_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let staging = tempfile::tempdir().unwrap();
    let mut config = test_config(staging.path());
    adjust(&mut config);

    let remote = Arc::new(InMemoryRemote::new());
    let state = AppState::with_remote(config.clone(), remote.clone(), remote.clone());
    let router = build_app_router(state, &config);

    TestApp {
        router,
        remote,
        staging,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a multipart body built with [`multipart_body`].
pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Encode text fields and an optional `audio` file part.
pub fn multipart_body(fields: &[(&str, &str)], audio: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = audio {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"recording.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// The fields of a complete submission.
pub fn complete_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Ali"),
        ("gender", "Male"),
        ("nationality", "Malaysia"),
        ("surah", "2"),
        ("ayat", "255"),
        ("style", "Bayati"),
    ]
}
