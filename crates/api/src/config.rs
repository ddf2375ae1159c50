use std::path::PathBuf;

use tarannum_core::i18n::Locale;
use tarannum_core::ledger::{
    LedgerLocation, LedgerSchema, DEFAULT_LEDGER_NAME, DEFAULT_LEDGER_RANGE,
};
use tarannum_core::workflow::WorkflowConfig;
use tarannum_google::CredentialSource;

/// Environment variable holding the base64-encoded service-account key.
pub const CREDENTIALS_B64_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_B64";

/// Which implementation of the remote services to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteBackend {
    /// Google Drive and Sheets.
    Google,
    /// In-process store; nothing leaves the server.
    Memory,
}

impl RemoteBackend {
    pub fn name(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Memory => "memory",
        }
    }
}

/// Google-specific settings, present only for [`RemoteBackend::Google`].
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub credentials: CredentialSource,
    pub shared_drive_id: Option<String>,
    pub http_timeout_secs: u64,
}

/// Where submissions go and how they are presented.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub backend: RemoteBackend,
    pub google: Option<GoogleConfig>,
    pub audio_folder_id: String,
    pub ledger: LedgerLocation,
    /// Whether the form asks for gender and the ledger records it.
    pub record_gender: bool,
    pub locale: Locale,
    pub staging_dir: PathBuf,
}

impl IntakeConfig {
    pub fn schema(&self) -> LedgerSchema {
        LedgerSchema {
            include_gender: self.record_gender,
        }
    }

    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            audio_folder_id: self.audio_folder_id.clone(),
            ledger: self.ledger.clone(),
            schema: self.schema(),
            locale: self.locale,
            staging_dir: self.staging_dir.clone(),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the Google folder ids have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Largest accepted submission body in bytes (default: 50 MiB).
    pub max_upload_bytes: usize,
    pub intake: IntakeConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                          |
    /// |--------------------------------|----------------------------------|
    /// | `HOST`                         | `0.0.0.0`                        |
    /// | `PORT`                         | `3000`                           |
    /// | `CORS_ORIGINS`                 | `http://localhost:3000`          |
    /// | `REQUEST_TIMEOUT_SECS`         | `120`                            |
    /// | `SHUTDOWN_TIMEOUT_SECS`        | `30`                             |
    /// | `MAX_UPLOAD_BYTES`             | `52428800`                       |
    /// | `REMOTE_BACKEND`               | `google` (`google` or `memory`)  |
    /// | `AUDIO_FOLDER_ID`              | required for `google`            |
    /// | `METADATA_FOLDER_ID`           | required for `google`            |
    /// | `LEDGER_NAME`                  | `metadata`                       |
    /// | `LEDGER_RANGE`                 | `Sheet1!A1`                      |
    /// | `SHARED_DRIVE_ID`              | unset                            |
    /// | `RECORD_GENDER`                | `true`                           |
    /// | `LOCALE`                       | `en` (`en` or `ms`)              |
    /// | `STAGING_DIR`                  | system temp dir                  |
    /// | `GOOGLE_SERVICE_ACCOUNT_FILE`  | unset                            |
    /// | `GOOGLE_SERVICE_ACCOUNT_B64`   | used when no file is configured  |
    /// | `GOOGLE_HTTP_TIMEOUT_SECS`     | `60`                             |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values and on a `google` backend without folder
    /// ids, so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");

        let port: u16 = var("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS", "120")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = var("SHUTDOWN_TIMEOUT_SECS", "30")
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = var("MAX_UPLOAD_BYTES", "52428800")
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let backend = match var("REMOTE_BACKEND", "google").to_lowercase().as_str() {
            "google" => RemoteBackend::Google,
            "memory" => RemoteBackend::Memory,
            other => panic!("REMOTE_BACKEND must be 'google' or 'memory', got '{other}'"),
        };

        let folder = |key: &str, memory_default: &str| match (lookup(key), backend) {
            (Some(id), _) if !id.trim().is_empty() => id.trim().to_string(),
            (_, RemoteBackend::Memory) => memory_default.to_string(),
            (_, RemoteBackend::Google) => panic!("{key} must be set for the google backend"),
        };
        let audio_folder_id = folder("AUDIO_FOLDER_ID", "audio");
        let ledger = LedgerLocation {
            folder_id: folder("METADATA_FOLDER_ID", "metadata"),
            name: var("LEDGER_NAME", DEFAULT_LEDGER_NAME),
            range: var("LEDGER_RANGE", DEFAULT_LEDGER_RANGE),
        };

        let record_gender: bool = var("RECORD_GENDER", "true")
            .parse()
            .expect("RECORD_GENDER must be 'true' or 'false'");

        let locale = Locale::from_code(&var("LOCALE", "en"))
            .unwrap_or_else(|e| panic!("LOCALE is invalid: {e}"));

        let staging_dir = lookup("STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        let google = (backend == RemoteBackend::Google).then(|| {
            let credentials = match lookup("GOOGLE_SERVICE_ACCOUNT_FILE") {
                Some(path) if !path.trim().is_empty() => CredentialSource::File(path.into()),
                _ => CredentialSource::Base64Env(CREDENTIALS_B64_VAR.to_string()),
            };
            GoogleConfig {
                credentials,
                shared_drive_id: lookup("SHARED_DRIVE_ID").filter(|s| !s.trim().is_empty()),
                http_timeout_secs: var("GOOGLE_HTTP_TIMEOUT_SECS", "60")
                    .parse()
                    .expect("GOOGLE_HTTP_TIMEOUT_SECS must be a valid u64"),
            }
        });

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            max_upload_bytes,
            intake: IntakeConfig {
                backend,
                google,
                audio_folder_id,
                ledger,
                record_gender,
                locale,
                staging_dir,
            },
        }
    }
}
