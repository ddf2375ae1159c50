//! Sheets v4 client: spreadsheet creation and row appends.

use std::sync::Arc;

use serde::Deserialize;

use crate::auth::TokenProvider;
use crate::error::GoogleApiError;
use crate::http::{check_status, endpoint, parse_response};

pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: Option<String>,
}

/// HTTP client for the Sheets v4 API.
pub struct SheetsApi {
    client: reqwest::Client,
    auth: Arc<TokenProvider>,
    api_url: String,
}

impl SheetsApi {
    pub fn new(client: reqwest::Client, auth: Arc<TokenProvider>) -> Self {
        Self {
            client,
            auth,
            api_url: SHEETS_API_URL.to_string(),
        }
    }

    /// Send requests to `api_url` instead of the public endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Create an empty spreadsheet titled `title` in the account's root.
    pub async fn create_spreadsheet(&self, title: &str) -> Result<String, GoogleApiError> {
        let url = endpoint(&self.api_url, &["spreadsheets"])?;
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .post(url)
            .query(&[("fields", "spreadsheetId")])
            .bearer_auth(token)
            .json(&serde_json::json!({ "properties": { "title": title } }))
            .send()
            .await?;

        let created: CreatedSpreadsheet = parse_response(response).await?;
        created
            .spreadsheet_id
            .ok_or_else(|| GoogleApiError::Malformed("spreadsheet created without an id".into()))
    }

    /// Append `rows` to the table anchored at `range`.
    ///
    /// Values are written as-is (`valueInputOption=RAW`). `insert_data_option`
    /// is passed through when set, e.g. `INSERT_ROWS`.
    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
        insert_data_option: Option<&str>,
    ) -> Result<(), GoogleApiError> {
        let url = append_url(&self.api_url, spreadsheet_id, range)?;
        let token = self.auth.access_token().await?;

        let mut query = vec![("valueInputOption", "RAW")];
        if let Some(option) = insert_data_option {
            query.push(("insertDataOption", option));
        }

        let response = self
            .client
            .post(url)
            .query(&query)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": rows }))
            .send()
            .await?;

        check_status(response).await
    }
}

/// `.../spreadsheets/{id}/values/{range}:append`, with `range` encoded as one
/// path segment so sheet names may contain `#`, `/` or `?`.
fn append_url(
    api_url: &str,
    spreadsheet_id: &str,
    range: &str,
) -> Result<reqwest::Url, GoogleApiError> {
    let target = format!("{range}:append");
    endpoint(api_url, &["spreadsheets", spreadsheet_id, "values", &target])
}
