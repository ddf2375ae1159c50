//! Drive v3 client: multipart upload, folder-scoped search, re-parenting.
//!
//! Every call passes `supportsAllDrives=true` so files in shared drives are
//! visible and writable.

use std::sync::Arc;

use serde::Deserialize;

use crate::auth::TokenProvider;
use crate::error::GoogleApiError;
use crate::http::{check_status, endpoint, parse_response};

pub const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// MIME type Drive uses for native spreadsheets.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// A file as returned with `fields=id` or `fields=files(id, name)`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Build a search query for non-trashed files of `mime_type` named exactly
/// `name` directly inside `folder_id`.
pub fn folder_query(folder_id: &str, name: &str, mime_type: &str) -> String {
    format!(
        "'{}' in parents and name='{}' and mimeType='{}' and trashed=false",
        escape_query_value(folder_id),
        escape_query_value(name),
        escape_query_value(mime_type),
    )
}

/// Escape a value for use inside a single-quoted Drive query string.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Encode metadata and media as a `multipart/related` body.
pub fn multipart_related_body(
    metadata: &serde_json::Value,
    media: &[u8],
    media_type: &str,
    boundary: &str,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {media_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// HTTP client for the Drive v3 API.
pub struct DriveApi {
    client: reqwest::Client,
    auth: Arc<TokenProvider>,
    api_url: String,
    upload_url: String,
    /// Shared drive new uploads are tagged with.
    shared_drive_id: Option<String>,
}

impl DriveApi {
    pub fn new(
        client: reqwest::Client,
        auth: Arc<TokenProvider>,
        shared_drive_id: Option<String>,
    ) -> Self {
        Self {
            client,
            auth,
            api_url: DRIVE_API_URL.to_string(),
            upload_url: DRIVE_UPLOAD_URL.to_string(),
            shared_drive_id,
        }
    }

    /// Send metadata calls to `api_url` and uploads to `upload_url` instead
    /// of the public endpoints.
    pub fn with_base_urls(
        mut self,
        api_url: impl Into<String>,
        upload_url: impl Into<String>,
    ) -> Self {
        self.api_url = api_url.into();
        self.upload_url = upload_url.into();
        self
    }

    /// Upload `media` as a new file named `name` inside `parent_id`.
    ///
    /// Sends one `POST /files?uploadType=multipart` request; returns the new
    /// file's id.
    pub async fn create_file(
        &self,
        name: &str,
        parent_id: &str,
        media: Vec<u8>,
        media_type: &str,
    ) -> Result<DriveFile, GoogleApiError> {
        let mut metadata = serde_json::json!({
            "name": name,
            "parents": [parent_id],
        });
        if let Some(drive_id) = &self.shared_drive_id {
            metadata["driveId"] = serde_json::Value::String(drive_id.clone());
        }

        let boundary = format!("tarannum-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related_body(&metadata, &media, media_type, &boundary);
        let url = endpoint(&self.upload_url, &["files"])?;
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .post(url)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", "id"),
            ])
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        let file: DriveFile = parse_response(response).await?;
        tracing::debug!(file_id = %file.id, name, parent_id, "Uploaded file to Drive");
        Ok(file)
    }

    /// Run a files search across all drives the account can see.
    pub async fn list_files(&self, query: &str) -> Result<Vec<DriveFile>, GoogleApiError> {
        let url = endpoint(&self.api_url, &["files"])?;
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("q", query),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
                ("fields", "files(id, name)"),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        let list: FileList = parse_response(response).await?;
        Ok(list.files)
    }

    /// Add `folder_id` to the parents of `file_id`.
    pub async fn add_parent(&self, file_id: &str, folder_id: &str) -> Result<(), GoogleApiError> {
        let url = endpoint(&self.api_url, &["files", file_id])?;
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .patch(url)
            .query(&[("addParents", folder_id), ("supportsAllDrives", "true")])
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        check_status(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_matches_name_type_and_folder() {
        assert_eq!(
            folder_query("folder1", "metadata", SPREADSHEET_MIME_TYPE),
            "'folder1' in parents and name='metadata' and \
             mimeType='application/vnd.google-apps.spreadsheet' and trashed=false"
        );
    }

    #[test]
    fn query_escapes_quotes_and_backslashes() {
        assert_eq!(
            folder_query("f", r"Ali's \ sheet", "m"),
            r"'f' in parents and name='Ali\'s \\ sheet' and mimeType='m' and trashed=false"
        );
    }

    #[test]
    fn related_body_has_both_parts() {
        let metadata = serde_json::json!({ "name": "a.wav" });
        let body = multipart_related_body(&metadata, b"RIFF", "audio/wav", "b0");
        let text = String::from_utf8(body).unwrap();

        assert!(text.starts_with("--b0\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n"));
        assert!(text.contains(r#"{"name":"a.wav"}"#));
        assert!(text.contains("--b0\r\nContent-Type: audio/wav\r\n\r\nRIFF\r\n--b0--\r\n"));
    }
}
