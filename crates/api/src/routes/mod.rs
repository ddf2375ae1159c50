pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /form/choices                                    style and gender options (GET)
/// /submissions                                     submit one recording (POST, multipart)
/// ```
///
/// The submission route lifts axum's default body limit to
/// `max_upload_bytes` so whole recordings fit in one request.
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/form/choices", get(handlers::form::form_choices))
        .route(
            "/submissions",
            post(handlers::submission::create_submission)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// Root-level page serving the intake form.
pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::form::form_page))
}
