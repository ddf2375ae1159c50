//! The metadata ledger: its column layout and find-or-provision logic.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::RemoteError;
use crate::i18n::Locale;
use crate::remote::{InsertMode, LedgerBackend, LedgerId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default spreadsheet title.
pub const DEFAULT_LEDGER_NAME: &str = "metadata";

/// Default anchor for appends; the service finds the table below it.
pub const DEFAULT_LEDGER_RANGE: &str = "Sheet1!A1";

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Column layout of the ledger.
///
/// Column order is fixed: Timestamp, Name, [Gender], Nationality, Surah,
/// Ayat, Style, Artifact id. The gender column exists only when
/// `include_gender` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSchema {
    pub include_gender: bool,
}

impl Default for LedgerSchema {
    fn default() -> Self {
        Self {
            include_gender: true,
        }
    }
}

impl LedgerSchema {
    pub fn column_count(self) -> usize {
        if self.include_gender {
            8
        } else {
            7
        }
    }

    /// Header row written once when the ledger is created.
    pub fn header(self, locale: Locale) -> Vec<String> {
        let labels: [&str; 8] = match locale {
            Locale::En => [
                "Timestamp",
                "Name",
                "Gender",
                "Nationality",
                "Surah",
                "Ayat",
                "Style",
                "Audio File ID",
            ],
            Locale::Ms => [
                "Timestamp",
                "Nama",
                "Jantina",
                "Nationality",
                "Surah",
                "Ayat",
                "Jenis Tarannum",
                "File ID Audio",
            ],
        };

        labels
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.include_gender || *idx != 2)
            .map(|(_, label)| label.to_string())
            .collect()
    }
}

/// Where the ledger lives and how to address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLocation {
    pub folder_id: String,
    pub name: String,
    pub range: String,
}

impl LedgerLocation {
    pub fn new(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: folder_id.into(),
            name: DEFAULT_LEDGER_NAME.to_string(),
            range: DEFAULT_LEDGER_RANGE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Finds the ledger spreadsheet, creating and heading it on first use.
pub struct LedgerResolver {
    backend: Arc<dyn LedgerBackend>,
    header: Vec<String>,
    range: String,
    /// Serializes resolution inside this process so two concurrent first
    /// submissions cannot both create a ledger. Separate processes can still
    /// race: the storage API has no conditional create.
    provision_lock: Mutex<()>,
}

impl LedgerResolver {
    pub fn new(backend: Arc<dyn LedgerBackend>, header: Vec<String>, range: String) -> Self {
        Self {
            backend,
            header,
            range,
            provision_lock: Mutex::new(()),
        }
    }

    /// Return the id of the spreadsheet named `name` in `folder_id`.
    ///
    /// If several match, the first one listed is used. If none does, a
    /// spreadsheet is created, given the header row and then moved into the
    /// folder.
    /// Calling this again afterwards finds the same spreadsheet and writes
    /// nothing.
    pub async fn resolve_or_create(
        &self,
        folder_id: &str,
        name: &str,
    ) -> Result<LedgerId, RemoteError> {
        let _guard = self.provision_lock.lock().await;

        let matches = self.backend.find_spreadsheets(folder_id, name).await?;
        if let Some(first) = matches.first() {
            if matches.len() > 1 {
                tracing::warn!(
                    folder_id,
                    name,
                    count = matches.len(),
                    ledger_id = %first,
                    "Multiple ledgers share a name, using the first listed"
                );
            }
            return Ok(first.clone());
        }

        let ledger_id = self.backend.create_spreadsheet(name).await?;
        tracing::info!(%ledger_id, name, "Created ledger spreadsheet");

        // Header first: the sheet only becomes findable once it is in the
        // folder, so a failure here never leaves a headerless ledger behind.
        self.backend
            .append_rows(
                &ledger_id,
                &self.range,
                std::slice::from_ref(&self.header),
                InsertMode::Overwrite,
            )
            .await?;
        self.backend.add_parent(&ledger_id, folder_id).await?;
        tracing::info!(%ledger_id, folder_id, "Ledger provisioned with header row");

        Ok(ledger_id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::memory::{FailPoint, InMemoryRemote};

    fn resolver(remote: &Arc<InMemoryRemote>) -> LedgerResolver {
        LedgerResolver::new(
            remote.clone(),
            LedgerSchema::default().header(Locale::En),
            DEFAULT_LEDGER_RANGE.to_string(),
        )
    }

    #[test]
    fn header_without_gender_drops_one_column() {
        let header = LedgerSchema {
            include_gender: false,
        }
        .header(Locale::Ms);
        assert_eq!(
            header,
            vec![
                "Timestamp",
                "Nama",
                "Nationality",
                "Surah",
                "Ayat",
                "Jenis Tarannum",
                "File ID Audio"
            ]
        );
    }

    #[tokio::test]
    async fn creates_once_then_reuses() {
        let remote = Arc::new(InMemoryRemote::new());
        let resolver = resolver(&remote);

        let first = resolver.resolve_or_create("meta", "metadata").await.unwrap();
        let second = resolver.resolve_or_create("meta", "metadata").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(remote.spreadsheets_named("metadata").len(), 1);
        assert_eq!(remote.parents_of(&first), vec!["meta".to_string()]);

        let rows = remote.rows(&first);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Timestamp");
        assert_eq!(rows[0].len(), 8);
    }

    #[tokio::test]
    async fn failed_header_write_leaves_no_findable_ledger() {
        let remote = Arc::new(InMemoryRemote::new());
        let resolver = resolver(&remote);

        remote.fail_at(Some(FailPoint::Append));
        assert!(resolver.resolve_or_create("meta", "metadata").await.is_err());

        remote.fail_at(None);
        let id = resolver.resolve_or_create("meta", "metadata").await.unwrap();

        let rows = remote.rows(&id);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Timestamp");
        assert_eq!(remote.parents_of(&id), vec!["meta".to_string()]);
        assert_eq!(
            resolver.resolve_or_create("meta", "metadata").await.unwrap(),
            id
        );
    }

    #[tokio::test]
    async fn existing_ledger_is_found_without_writes() {
        let remote = Arc::new(InMemoryRemote::new());
        let existing = remote.seed_spreadsheet("meta", "metadata");

        let id = resolver(&remote)
            .resolve_or_create("meta", "metadata")
            .await
            .unwrap();

        assert_eq!(id, existing);
        assert!(remote.rows(&existing).is_empty());
    }

    #[tokio::test]
    async fn first_listed_match_wins() {
        let remote = Arc::new(InMemoryRemote::new());
        let first = remote.seed_spreadsheet("meta", "metadata");
        remote.seed_spreadsheet("meta", "metadata");

        let id = resolver(&remote)
            .resolve_or_create("meta", "metadata")
            .await
            .unwrap();
        assert_eq!(id, first);
    }

    #[tokio::test]
    async fn name_match_is_exact_and_folder_scoped() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.seed_spreadsheet("meta", "metadata (old)");
        remote.seed_spreadsheet("elsewhere", "metadata");

        resolver(&remote)
            .resolve_or_create("meta", "metadata")
            .await
            .unwrap();
        assert_eq!(remote.spreadsheets_named("metadata").len(), 2);
    }

    #[tokio::test]
    async fn trashed_ledger_is_ignored() {
        let remote = Arc::new(InMemoryRemote::new());
        let trashed = remote.seed_spreadsheet("meta", "metadata");
        remote.trash(&trashed);

        let id = resolver(&remote)
            .resolve_or_create("meta", "metadata")
            .await
            .unwrap();
        assert_ne!(id, trashed);
    }

    /// Delays every search so concurrent callers overlap.
    struct SlowSearch(Arc<InMemoryRemote>);

    #[async_trait]
    impl LedgerBackend for SlowSearch {
        async fn find_spreadsheets(
            &self,
            folder_id: &str,
            name: &str,
        ) -> Result<Vec<LedgerId>, RemoteError> {
            let found = self.0.find_spreadsheets(folder_id, name).await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            found
        }

        async fn create_spreadsheet(&self, title: &str) -> Result<LedgerId, RemoteError> {
            self.0.create_spreadsheet(title).await
        }

        async fn add_parent(&self, file_id: &str, folder_id: &str) -> Result<(), RemoteError> {
            self.0.add_parent(file_id, folder_id).await
        }

        async fn append_rows(
            &self,
            ledger_id: &str,
            range: &str,
            rows: &[Vec<String>],
            mode: InsertMode,
        ) -> Result<(), RemoteError> {
            self.0.append_rows(ledger_id, range, rows, mode).await
        }
    }

    #[tokio::test]
    async fn concurrent_first_use_creates_one_ledger() {
        let remote = Arc::new(InMemoryRemote::new());
        let resolver = Arc::new(LedgerResolver::new(
            Arc::new(SlowSearch(remote.clone())),
            LedgerSchema::default().header(Locale::En),
            DEFAULT_LEDGER_RANGE.to_string(),
        ));

        let a = tokio::spawn({
            let resolver = resolver.clone();
            async move { resolver.resolve_or_create("meta", "metadata").await }
        });
        let b = tokio::spawn({
            let resolver = resolver.clone();
            async move { resolver.resolve_or_create("meta", "metadata").await }
        });

        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
        assert_eq!(a, b);
        assert_eq!(remote.spreadsheets_named("metadata").len(), 1);
        assert_eq!(remote.rows(&a).len(), 1);
    }
}
