/// Domain-level errors raised while shaping a submission.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown {field} value: '{value}'")]
    UnknownChoice { field: &'static str, value: String },
}

/// Errors returned by the remote storage and spreadsheet services.
///
/// Implementations of [`crate::remote::ArtifactStore`] and
/// [`crate::remote::LedgerBackend`] convert their transport-specific failures
/// into one of these variants. No variant is retried.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (network, DNS, TLS, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("Remote API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Obtaining an access token failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The service answered 2xx but the payload was not what we expected.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Reading the local file to upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
