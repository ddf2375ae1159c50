//! In-process implementation of the remote service traits.
//!
//! Selected with `REMOTE_BACKEND=memory` for local development without
//! service credentials, and used throughout the test suites. Everything is
//! lost when the process exits.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::remote::{ArtifactId, ArtifactStore, InsertMode, LedgerBackend, LedgerId};

/// An operation that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Store,
    Find,
    Create,
    AddParent,
    Append,
}

/// A recording held by the in-memory store.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub id: ArtifactId,
    pub name: String,
    pub folder_id: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
struct Spreadsheet {
    id: LedgerId,
    name: String,
    parents: Vec<String>,
    trashed: bool,
    rows: Vec<(Vec<String>, InsertMode)>,
}

#[derive(Debug, Default)]
struct State {
    artifacts: Vec<StoredArtifact>,
    spreadsheets: Vec<Spreadsheet>,
    next_id: u64,
    calls: usize,
    fail_at: Option<FailPoint>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Count the call and fail it if it matches the configured fail point.
    fn enter(&mut self, point: FailPoint) -> Result<(), RemoteError> {
        self.calls += 1;
        if self.fail_at == Some(point) {
            return Err(RemoteError::Api {
                status: 503,
                body: format!("injected failure at {point:?}"),
            });
        }
        Ok(())
    }

    fn sheet_mut(&mut self, id: &str) -> Result<&mut Spreadsheet, RemoteError> {
        self.spreadsheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RemoteError::Api {
                status: 404,
                body: format!("File not found: {id}"),
            })
    }
}

/// Artifact store and ledger backend kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    state: Mutex<State>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Poisoning is ignored: every mutation is a single push or assignment.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every call to `point` fail until cleared with `None`.
    pub fn fail_at(&self, point: Option<FailPoint>) {
        self.lock().fail_at = point;
    }

    /// Number of remote operations attempted so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    pub fn artifacts(&self) -> Vec<StoredArtifact> {
        self.lock().artifacts.clone()
    }

    /// Ids of every non-trashed spreadsheet with this exact name, any folder.
    pub fn spreadsheets_named(&self, name: &str) -> Vec<LedgerId> {
        self.lock()
            .spreadsheets
            .iter()
            .filter(|s| s.name == name && !s.trashed)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn parents_of(&self, id: &str) -> Vec<String> {
        self.lock()
            .spreadsheets
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.parents.clone())
            .unwrap_or_default()
    }

    pub fn rows(&self, id: &str) -> Vec<Vec<String>> {
        self.lock()
            .spreadsheets
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.rows.iter().map(|(row, _)| row.clone()).collect())
            .unwrap_or_default()
    }

    /// Insert modes requested for each row of a spreadsheet, in order.
    pub fn insert_modes(&self, id: &str) -> Vec<InsertMode> {
        self.lock()
            .spreadsheets
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.rows.iter().map(|(_, mode)| *mode).collect())
            .unwrap_or_default()
    }

    /// Place an existing, empty spreadsheet in a folder.
    pub fn seed_spreadsheet(&self, folder_id: &str, name: &str) -> LedgerId {
        let mut state = self.lock();
        let id = state.next_id("sheet");
        state.spreadsheets.push(Spreadsheet {
            id: id.clone(),
            name: name.to_string(),
            parents: vec![folder_id.to_string()],
            trashed: false,
            rows: Vec::new(),
        });
        id
    }

    pub fn trash(&self, id: &str) {
        if let Ok(sheet) = self.lock().sheet_mut(id) {
            sheet.trashed = true;
        }
    }
}

#[async_trait]
impl ArtifactStore for InMemoryRemote {
    async fn store(&self, local_path: &Path, folder_id: &str) -> Result<ArtifactId, RemoteError> {
        self.lock().enter(FailPoint::Store)?;

        let bytes = tokio::fs::read(local_path).await?;
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut state = self.lock();
        let id = state.next_id("file");
        tracing::debug!(
            artifact_id = %id,
            name = %name,
            folder_id,
            size = bytes.len(),
            "Stored artifact in memory"
        );
        state.artifacts.push(StoredArtifact {
            id: id.clone(),
            name,
            folder_id: folder_id.to_string(),
            bytes,
        });
        Ok(id)
    }
}

#[async_trait]
impl LedgerBackend for InMemoryRemote {
    async fn find_spreadsheets(
        &self,
        folder_id: &str,
        name: &str,
    ) -> Result<Vec<LedgerId>, RemoteError> {
        let mut state = self.lock();
        state.enter(FailPoint::Find)?;
        Ok(state
            .spreadsheets
            .iter()
            .filter(|s| !s.trashed && s.name == name && s.parents.iter().any(|p| p == folder_id))
            .map(|s| s.id.clone())
            .collect())
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<LedgerId, RemoteError> {
        let mut state = self.lock();
        state.enter(FailPoint::Create)?;
        let id = state.next_id("sheet");
        state.spreadsheets.push(Spreadsheet {
            id: id.clone(),
            name: title.to_string(),
            parents: Vec::new(),
            trashed: false,
            rows: Vec::new(),
        });
        Ok(id)
    }

    async fn add_parent(&self, file_id: &str, folder_id: &str) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.enter(FailPoint::AddParent)?;
        let sheet = state.sheet_mut(file_id)?;
        if !sheet.parents.iter().any(|p| p == folder_id) {
            sheet.parents.push(folder_id.to_string());
        }
        Ok(())
    }

    async fn append_rows(
        &self,
        ledger_id: &str,
        _range: &str,
        rows: &[Vec<String>],
        mode: InsertMode,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.enter(FailPoint::Append)?;
        let sheet = state.sheet_mut(ledger_id)?;
        sheet
            .rows
            .extend(rows.iter().map(|row| (row.clone(), mode)));
        Ok(())
    }
}
