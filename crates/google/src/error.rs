use tarannum_core::error::RemoteError;

/// Errors from the Google REST layer.
#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout) or the
    /// body could not be decoded.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Google returned a non-2xx status code.
    #[error("Google API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Signing the assertion or exchanging it for a token failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A 2xx response without the fields we asked for.
    #[error("Unexpected response: {0}")]
    Malformed(String),

    /// An endpoint URL could not be built from the configured base.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GoogleApiError> for RemoteError {
    fn from(err: GoogleApiError) -> Self {
        match err {
            GoogleApiError::Request(e) if e.is_decode() => RemoteError::Malformed(e.to_string()),
            GoogleApiError::Request(e) => RemoteError::Transport(e.to_string()),
            GoogleApiError::ApiError { status, body } => RemoteError::Api { status, body },
            GoogleApiError::Auth(msg) => RemoteError::Auth(msg),
            GoogleApiError::Malformed(msg) => RemoteError::Malformed(msg),
            GoogleApiError::InvalidUrl(msg) => RemoteError::Transport(msg),
            GoogleApiError::Io(e) => RemoteError::Io(e),
        }
    }
}
