use std::sync::Arc;
use std::time::Duration;

use tarannum_core::memory::InMemoryRemote;
use tarannum_core::remote::{ArtifactStore, LedgerBackend};
use tarannum_core::workflow::SubmissionWorkflow;
use tarannum_google::credentials::CredentialError;
use tarannum_google::{GoogleApiError, GoogleSettings, GoogleWorkspace};

use crate::config::{RemoteBackend, ServerConfig};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Submission pipeline, holding the process-wide remote clients.
    pub workflow: Arc<SubmissionWorkflow>,
}

/// Failures while wiring up the remote clients at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Google backend selected but not configured")]
    MissingGoogleConfig,

    #[error("Failed to load service-account credentials: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Failed to build Google client: {0}")]
    Google(#[from] GoogleApiError),
}

impl AppState {
    /// Build state with remote clients chosen by `config.intake.backend`.
    pub fn from_config(config: ServerConfig) -> Result<Self, StartupError> {
        let (store, ledger): (Arc<dyn ArtifactStore>, Arc<dyn LedgerBackend>) =
            match config.intake.backend {
                RemoteBackend::Google => {
                    let google = config
                        .intake
                        .google
                        .as_ref()
                        .ok_or(StartupError::MissingGoogleConfig)?;
                    let key = google.credentials.load()?;
                    tracing::info!(source = %google.credentials, "Loaded service-account credentials");

                    let workspace = Arc::new(GoogleWorkspace::connect(
                        key,
                        GoogleSettings {
                            shared_drive_id: google.shared_drive_id.clone(),
                            http_timeout: Duration::from_secs(google.http_timeout_secs),
                            ..GoogleSettings::default()
                        },
                    )?);
                    let store: Arc<dyn ArtifactStore> = workspace.clone();
                    let ledger: Arc<dyn LedgerBackend> = workspace;
                    (store, ledger)
                }
                RemoteBackend::Memory => {
                    tracing::warn!("Using in-memory remote backend, submissions are not persisted");
                    let remote = Arc::new(InMemoryRemote::new());
                    let store: Arc<dyn ArtifactStore> = remote.clone();
                    let ledger: Arc<dyn LedgerBackend> = remote;
                    (store, ledger)
                }
            };

        Ok(Self::with_remote(config, store, ledger))
    }

    /// Build state around already-constructed remote clients.
    pub fn with_remote(
        config: ServerConfig,
        store: Arc<dyn ArtifactStore>,
        ledger: Arc<dyn LedgerBackend>,
    ) -> Self {
        let workflow = SubmissionWorkflow::new(store, ledger, config.intake.workflow_config());
        Self {
            config: Arc::new(config),
            workflow: Arc::new(workflow),
        }
    }
}
