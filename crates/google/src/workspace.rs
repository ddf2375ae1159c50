//! Drive + Sheets bundled behind the core remote traits.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tarannum_core::error::RemoteError;
use tarannum_core::remote::{ArtifactId, ArtifactStore, InsertMode, LedgerBackend, LedgerId};

use crate::auth::TokenProvider;
use crate::credentials::ServiceAccountKey;
use crate::drive::{
    folder_query, DriveApi, DRIVE_API_URL, DRIVE_UPLOAD_URL, SPREADSHEET_MIME_TYPE,
};
use crate::error::GoogleApiError;
use crate::sheets::{SheetsApi, SHEETS_API_URL};

/// MIME type declared for uploaded recordings.
pub const AUDIO_MIME_TYPE: &str = "audio/wav";

/// Default per-request timeout for Google API calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GoogleSettings {
    /// Shared drive uploads are tagged with, if any.
    pub shared_drive_id: Option<String>,
    pub http_timeout: Duration,
    /// Base URLs of the REST endpoints. Overridden in tests.
    pub drive_api_url: String,
    pub drive_upload_url: String,
    pub sheets_api_url: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            shared_drive_id: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            drive_api_url: DRIVE_API_URL.to_string(),
            drive_upload_url: DRIVE_UPLOAD_URL.to_string(),
            sheets_api_url: SHEETS_API_URL.to_string(),
        }
    }
}

/// Process-wide Google client handle, built once at startup and shared.
pub struct GoogleWorkspace {
    drive: DriveApi,
    sheets: SheetsApi,
}

impl GoogleWorkspace {
    /// Build clients for `key`. No network traffic happens until first use.
    pub fn connect(key: ServiceAccountKey, settings: GoogleSettings) -> Result<Self, GoogleApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()?;
        let auth = Arc::new(TokenProvider::new(client.clone(), key)?);

        tracing::info!(
            client_email = %auth.client_email(),
            shared_drive_id = ?settings.shared_drive_id,
            "Google workspace client ready"
        );

        let drive = DriveApi::new(client.clone(), Arc::clone(&auth), settings.shared_drive_id)
            .with_base_urls(settings.drive_api_url, settings.drive_upload_url);
        let sheets = SheetsApi::new(client, auth).with_api_url(settings.sheets_api_url);

        Ok(Self { drive, sheets })
    }
}

#[async_trait]
impl ArtifactStore for GoogleWorkspace {
    async fn store(&self, local_path: &Path, folder_id: &str) -> Result<ArtifactId, RemoteError> {
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                RemoteError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("no file name in {}", local_path.display()),
                ))
            })?;
        let media = tokio::fs::read(local_path).await?;

        let file = self
            .drive
            .create_file(&name, folder_id, media, AUDIO_MIME_TYPE)
            .await?;
        Ok(file.id)
    }
}

#[async_trait]
impl LedgerBackend for GoogleWorkspace {
    async fn find_spreadsheets(
        &self,
        folder_id: &str,
        name: &str,
    ) -> Result<Vec<LedgerId>, RemoteError> {
        let query = folder_query(folder_id, name, SPREADSHEET_MIME_TYPE);
        let files = self.drive.list_files(&query).await?;
        Ok(files.into_iter().map(|f| f.id).collect())
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<LedgerId, RemoteError> {
        Ok(self.sheets.create_spreadsheet(title).await?)
    }

    async fn add_parent(&self, file_id: &str, folder_id: &str) -> Result<(), RemoteError> {
        Ok(self.drive.add_parent(file_id, folder_id).await?)
    }

    async fn append_rows(
        &self,
        ledger_id: &str,
        range: &str,
        rows: &[Vec<String>],
        mode: InsertMode,
    ) -> Result<(), RemoteError> {
        let insert_data_option = match mode {
            InsertMode::Overwrite => None,
            InsertMode::InsertRows => Some("INSERT_ROWS"),
        };
        Ok(self
            .sheets
            .append_values(ledger_id, range, rows, insert_data_option)
            .await?)
    }
}
