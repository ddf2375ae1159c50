//! Response helpers shared by the Drive and Sheets clients.

use crate::error::GoogleApiError;

/// Join `segments` onto `base`, percent-encoding each one as a single path
/// segment.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<reqwest::Url, GoogleApiError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| GoogleApiError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| GoogleApiError::InvalidUrl(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Return the response unchanged on 2xx, otherwise an
/// [`GoogleApiError::ApiError`] carrying the status and body text.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GoogleApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(GoogleApiError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GoogleApiError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

/// Assert the response has a success status code, discarding the body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), GoogleApiError> {
    ensure_success(response).await?;
    Ok(())
}
