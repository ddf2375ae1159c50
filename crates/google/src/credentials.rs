//! Service-account credential loading.
//!
//! The key can come from a JSON file on disk or from an environment variable
//! holding the same JSON, base64-encoded (for hosts where mounting files is
//! awkward). Either way it is loaded once at startup.

use std::fmt;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account key file this service uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Failed to read credential file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable {0} is not set")]
    MissingEnv(String),

    #[error("{var} is not valid base64: {source}")]
    Base64 {
        var: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Credential JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the service-account key is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Path to the key JSON file.
    File(PathBuf),
    /// Name of an environment variable holding the base64-encoded key JSON.
    Base64Env(String),
}

impl CredentialSource {
    pub fn load(&self) -> Result<ServiceAccountKey, CredentialError> {
        match self {
            Self::File(path) => {
                let raw = std::fs::read(path).map_err(|source| CredentialError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(serde_json::from_slice(&raw)?)
            }
            Self::Base64Env(var) => {
                let encoded =
                    std::env::var(var).map_err(|_| CredentialError::MissingEnv(var.clone()))?;
                decode_base64_key(var, &encoded)
            }
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Base64Env(var) => write!(f, "env {var} (base64)"),
        }
    }
}

/// Decode a base64 payload (surrounding whitespace ignored) into a key.
/// `var` only labels errors.
pub fn decode_base64_key(var: &str, encoded: &str) -> Result<ServiceAccountKey, CredentialError> {
    let raw = STANDARD
        .decode(encoded.trim())
        .map_err(|source| CredentialError::Base64 {
            var: var.to_string(),
            source,
        })?;
    Ok(serde_json::from_slice(&raw)?)
}
