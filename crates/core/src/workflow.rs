//! End-to-end handling of one submission.
//!
//! ```text
//! Idle -> Validating -> Staging -> Uploading -> ResolvingLedger -> Appending -> Done
//!                          \___________\______________\_______________\--> Failed
//! ```
//!
//! Validation failures return to `Idle` without touching the network. Any
//! error from `Staging` onward ends in `Failed`; the staged file is removed
//! on every path, including when the submit future is dropped.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::error::RemoteError;
use crate::i18n::Locale;
use crate::ledger::{LedgerLocation, LedgerResolver, LedgerSchema};
use crate::naming::artifact_file_name;
use crate::remote::{ArtifactId, ArtifactStore, InsertMode, LedgerBackend};
use crate::staging::StagedAudio;
use crate::submission::{
    AudioInput, FormField, FormRejection, Submission, SubmissionDetails, SubmissionForm,
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Validating,
    Staging,
    Uploading,
    ResolvingLedger,
    Appending,
    Done,
    Failed,
}

impl WorkflowState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Staging => "staging",
            Self::Uploading => "uploading",
            Self::ResolvingLedger => "resolving_ledger",
            Self::Appending => "appending",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// A failure after validation, classified by the stage that raised it.
///
/// `Display` is the underlying error text alone, which is what the status
/// message embeds.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Staging(#[source] std::io::Error),

    #[error("{source}")]
    Upload {
        #[source]
        source: RemoteError,
    },

    /// The recording was uploaded but the ledger could not be found or made.
    #[error("{source}")]
    LedgerResolution {
        artifact_id: ArtifactId,
        #[source]
        source: RemoteError,
    },

    /// The recording was uploaded but its row was not appended.
    #[error("{source}")]
    Append {
        artifact_id: ArtifactId,
        #[source]
        source: RemoteError,
    },
}

impl SubmissionError {
    /// The state the workflow was in when the error occurred.
    pub fn state(&self) -> WorkflowState {
        match self {
            Self::Staging(_) => WorkflowState::Staging,
            Self::Upload { .. } => WorkflowState::Uploading,
            Self::LedgerResolution { .. } => WorkflowState::ResolvingLedger,
            Self::Append { .. } => WorkflowState::Appending,
        }
    }

    /// An uploaded recording that no ledger row references.
    pub fn orphaned_artifact(&self) -> Option<&str> {
        match self {
            Self::LedgerResolution { artifact_id, .. } | Self::Append { artifact_id, .. } => {
                Some(artifact_id.as_str())
            }
            Self::Staging(_) | Self::Upload { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    Saved(Submission),
    MissingAudio,
    Incomplete(Vec<FormField>),
    Failed(SubmissionError),
}

impl SubmissionOutcome {
    /// Stable machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Saved(_) => "saved",
            Self::MissingAudio => "missing_audio",
            Self::Incomplete(_) => "incomplete",
            Self::Failed(_) => "failed",
        }
    }

    pub fn artifact_id(&self) -> Option<&str> {
        match self {
            Self::Saved(submission) => Some(submission.artifact_id.as_str()),
            Self::Failed(err) => err.orphaned_artifact(),
            Self::MissingAudio | Self::Incomplete(_) => None,
        }
    }

    /// The single human-readable status line shown to the submitter.
    pub fn status_message(&self, locale: Locale) -> String {
        match self {
            Self::Saved(submission) => locale.saved(&submission.artifact_id),
            Self::MissingAudio => locale.missing_audio().to_string(),
            Self::Incomplete(fields) => {
                let labels: Vec<&str> = fields.iter().map(|f| f.label(locale)).collect();
                locale.incomplete(&labels)
            }
            Self::Failed(err) => locale.failed(&err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Fixed destinations and presentation settings for every submission.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Folder that receives uploaded recordings.
    pub audio_folder_id: String,
    pub ledger: LedgerLocation,
    pub schema: LedgerSchema,
    pub locale: Locale,
    /// Root under which audio is staged before upload.
    pub staging_dir: PathBuf,
}

pub struct SubmissionWorkflow {
    store: Arc<dyn ArtifactStore>,
    ledger: Arc<dyn LedgerBackend>,
    resolver: LedgerResolver,
    config: WorkflowConfig,
}

impl SubmissionWorkflow {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        ledger: Arc<dyn LedgerBackend>,
        config: WorkflowConfig,
    ) -> Self {
        let resolver = LedgerResolver::new(
            Arc::clone(&ledger),
            config.schema.header(config.locale),
            config.ledger.range.clone(),
        );
        Self {
            store,
            ledger,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Process a form using the local wall clock as the submit time.
    pub async fn submit(&self, form: SubmissionForm) -> SubmissionOutcome {
        self.submit_at(form, chrono::Local::now().naive_local()).await
    }

    pub async fn submit_at(&self, form: SubmissionForm, now: NaiveDateTime) -> SubmissionOutcome {
        tracing::debug!(state = %WorkflowState::Validating, "Submission received");

        let (details, audio) = match form.into_parts(self.config.schema) {
            Ok(parts) => parts,
            Err(FormRejection::MissingAudio) => {
                tracing::info!(state = %WorkflowState::Idle, "Submission rejected: no audio");
                return SubmissionOutcome::MissingAudio;
            }
            Err(FormRejection::Incomplete(fields)) => {
                tracing::info!(
                    state = %WorkflowState::Idle,
                    missing = ?fields,
                    "Submission rejected: incomplete form"
                );
                return SubmissionOutcome::Incomplete(fields);
            }
        };

        match self.process(details, audio, now).await {
            Ok(submission) => {
                tracing::info!(
                    state = %WorkflowState::Done,
                    artifact_id = %submission.artifact_id,
                    style = %submission.details.style,
                    "Submission saved"
                );
                SubmissionOutcome::Saved(submission)
            }
            Err(err) => {
                if let Some(artifact_id) = err.orphaned_artifact() {
                    tracing::warn!(
                        state = %WorkflowState::Failed,
                        failed_in = %err.state(),
                        artifact_id,
                        error = %err,
                        "Recording uploaded but no ledger row was written"
                    );
                } else {
                    tracing::error!(
                        state = %WorkflowState::Failed,
                        failed_in = %err.state(),
                        error = %err,
                        "Submission failed"
                    );
                }
                SubmissionOutcome::Failed(err)
            }
        }
    }

    async fn process(
        &self,
        details: SubmissionDetails,
        audio: AudioInput,
        now: NaiveDateTime,
    ) -> Result<Submission, SubmissionError> {
        let file_name = artifact_file_name(&now, &details.style);

        tracing::debug!(state = %WorkflowState::Staging, file_name = %file_name, "Staging audio");
        let staged = StagedAudio::write(&self.config.staging_dir, &file_name, &audio.bytes)
            .await
            .map_err(SubmissionError::Staging)?;

        tracing::debug!(state = %WorkflowState::Uploading, "Uploading audio");
        let uploaded = self
            .store
            .store(staged.path(), &self.config.audio_folder_id)
            .await;
        staged.discard().await;
        let artifact_id = uploaded.map_err(|source| SubmissionError::Upload { source })?;

        tracing::debug!(state = %WorkflowState::ResolvingLedger, %artifact_id, "Resolving ledger");
        let location = &self.config.ledger;
        let ledger_id = match self
            .resolver
            .resolve_or_create(&location.folder_id, &location.name)
            .await
        {
            Ok(id) => id,
            Err(source) => {
                return Err(SubmissionError::LedgerResolution {
                    artifact_id,
                    source,
                })
            }
        };

        let submission = Submission {
            timestamp: now,
            details,
            artifact_id,
        };
        let row = submission.ledger_row(self.config.schema, self.config.locale);

        tracing::debug!(state = %WorkflowState::Appending, %ledger_id, "Appending ledger row");
        if let Err(source) = self
            .ledger
            .append_rows(
                &ledger_id,
                &location.range,
                std::slice::from_ref(&row),
                InsertMode::InsertRows,
            )
            .await
        {
            return Err(SubmissionError::Append {
                artifact_id: submission.artifact_id,
                source,
            });
        }

        Ok(submission)
    }
}
