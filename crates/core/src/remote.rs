//! Seams to the remote file-storage and spreadsheet services.
//!
//! The workflow only talks to these traits. `tarannum-google` implements them
//! against Drive and Sheets; [`crate::memory::InMemoryRemote`] implements them
//! in-process.

use std::path::Path;

use async_trait::async_trait;

use crate::error::RemoteError;

/// Opaque identifier the storage service assigns to an uploaded recording.
pub type ArtifactId = String;

/// Opaque identifier of the ledger spreadsheet.
pub type LedgerId = String;

/// How appended rows interact with blank rows already below the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Service default: new values may land in existing blank rows.
    Overwrite,
    /// Insert fresh rows for the new values.
    InsertRows,
}

/// Uploads a local file into a folder of the remote storage service.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload the file at `local_path` into `folder_id`.
    ///
    /// The remote display name is the file's basename. No size or MIME checks
    /// happen here and failures are not retried.
    async fn store(&self, local_path: &Path, folder_id: &str) -> Result<ArtifactId, RemoteError>;
}

/// Primitive spreadsheet operations the ledger resolver is built from.
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    /// Non-trashed spreadsheets named exactly `name` inside `folder_id`, in
    /// the order the service lists them.
    async fn find_spreadsheets(
        &self,
        folder_id: &str,
        name: &str,
    ) -> Result<Vec<LedgerId>, RemoteError>;

    async fn create_spreadsheet(&self, title: &str) -> Result<LedgerId, RemoteError>;

    /// Add `folder_id` as a parent of an existing file.
    async fn add_parent(&self, file_id: &str, folder_id: &str) -> Result<(), RemoteError>;

    async fn append_rows(
        &self,
        ledger_id: &str,
        range: &str,
        rows: &[Vec<String>],
        mode: InsertMode,
    ) -> Result<(), RemoteError>;
}
