//! Pipeline controller: connectivity check, chunked fetch, optional
//! verification, extraction and cleanup, strictly in that order.
//!
//! The controller runs on one blocking worker thread and reports every step
//! to a `ProgressObserver`. It never exits the process: the run ends in a
//! `RunOutcome` and the caller decides what to do with it.

mod error;
mod event;
mod state;

pub use error::{ErrorKind, PipelineError};
pub use event::{NullObserver, ProgressEvent, ProgressObserver};
pub use state::PipelineState;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::archive::{ArchiveExtractor, ExtractReport};
use crate::connectivity::ConnectivityProbe;
use crate::fetcher::ChunkedFetcher;
use crate::job::DownloadJob;
use crate::progress::TransferProgress;
use crate::remote::{ObjectMetadata, ObjectSource};
use crate::storage::JobWorkspace;
use crate::verify::{IntegrityVerifier, Verification};

/// Final message when the digest was checked.
pub const VERIFIED_MESSAGE: &str = "Successfully downloaded and verified file hash.";
/// Final message when no digest was given.
pub const EXTRACTED_MESSAGE: &str = "Successfully downloaded and extracted the file.";

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub object: ObjectMetadata,
    /// Destination folder holding the extracted entries.
    pub folder: PathBuf,
    pub verified: bool,
    pub extracted: ExtractReport,
    pub message: String,
}

#[derive(Debug)]
pub enum RunOutcome {
    Finished(RunSummary),
    Failed(PipelineError),
}

impl RunOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunOutcome::Finished(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            RunOutcome::Finished(_) => None,
            RunOutcome::Failed(e) => Some(e.kind()),
        }
    }
}

pub struct PipelineController<S> {
    job: DownloadJob,
    base_dir: PathBuf,
    source: S,
    probe: ConnectivityProbe,
    state: PipelineState,
}

impl<S: ObjectSource> PipelineController<S> {
    /// `base_dir` is where the job's destination folder gets created.
    pub fn new(
        job: DownloadJob,
        base_dir: impl Into<PathBuf>,
        source: S,
        probe: ConnectivityProbe,
    ) -> Self {
        Self {
            job,
            base_dir: base_dir.into(),
            source,
            probe,
            state: PipelineState::Idle,
        }
    }

    pub fn job(&self) -> &DownloadJob {
        &self.job
    }

    /// Run the whole pipeline once. Blocks until a terminal state is reached.
    pub fn run(mut self, observer: &dyn ProgressObserver) -> RunOutcome {
        let (workspace, file) = match JobWorkspace::create(&self.base_dir, &self.job) {
            Ok(created) => created,
            Err(e) => {
                let folder = self.base_dir.join(self.job.folder_out());
                return self.fail(PipelineError::fs("create", folder, e), observer);
            }
        };

        self.enter(PipelineState::CheckingConnectivity, observer);
        if !self.probe.check() {
            drop(file);
            workspace.discard_all();
            observer.on_event(ProgressEvent::ConnectivityResult(false));
            return self.fail(PipelineError::NetworkUnavailable, observer);
        }
        observer.on_event(ProgressEvent::ConnectivityResult(true));

        match self.run_stages(&workspace, file, observer) {
            Ok(summary) => RunOutcome::Finished(summary),
            Err(e) => {
                workspace.discard_partial();
                self.fail(e, observer)
            }
        }
    }

    fn run_stages(
        &mut self,
        workspace: &JobWorkspace,
        file: File,
        observer: &dyn ProgressObserver,
    ) -> Result<RunSummary, PipelineError> {
        let chunk_size = self.job.chunk_size();
        let archive = workspace.archive_path();

        self.enter(PipelineState::Fetching, observer);
        let mut sink = BufWriter::new(file);
        let fetched = ChunkedFetcher::new(&self.source, chunk_size).fetch(
            self.job.object_id(),
            &mut sink,
            observer,
        )?;
        let file = sink
            .into_inner()
            .map_err(|e| PipelineError::fs("write", archive, e.into_error()))?;
        file.sync_all()
            .map_err(|e| PipelineError::fs("sync", archive, e))?;
        drop(file);
        let total = fetched.metadata.size;

        let verified = match self.job.digest().cloned() {
            Some(expected) => {
                self.enter(PipelineState::Verifying, observer);
                let outcome = IntegrityVerifier::new(&expected, chunk_size)
                    .verify(archive, total, observer)
                    .map_err(|e| PipelineError::fs("read", archive, e))?;
                if let Verification::Mismatch {
                    expected: wanted,
                    actual,
                } = outcome
                {
                    return Err(PipelineError::IntegrityMismatch {
                        algorithm: expected.algorithm(),
                        expected: wanted,
                        actual,
                    });
                }
                true
            }
            None => false,
        };

        self.enter(PipelineState::Extracting, observer);
        let extracted =
            ArchiveExtractor::new(self.job.password()).extract_all(archive, workspace.folder())?;

        self.enter(PipelineState::Finalizing, observer);
        observer.on_event(ProgressEvent::Progress(TransferProgress {
            stage: PipelineState::Finalizing,
            bytes_transferred: total,
            total_bytes: total,
            percent: 100,
        }));
        if let Err(e) = workspace.remove_archive() {
            tracing::warn!(path = %archive.display(), error = %e, "could not remove archive after extraction");
        }

        let message = if verified {
            VERIFIED_MESSAGE
        } else {
            EXTRACTED_MESSAGE
        };
        self.enter_with(PipelineState::Finished, message.to_string(), observer);

        Ok(RunSummary {
            object: fetched.metadata,
            folder: workspace.folder().to_path_buf(),
            verified,
            extracted,
            message: message.to_string(),
        })
    }

    fn enter(&mut self, next: PipelineState, observer: &dyn ProgressObserver) {
        self.enter_with(next, next.label().to_string(), observer);
    }

    fn enter_with(&mut self, next: PipelineState, message: String, observer: &dyn ProgressObserver) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::info!(from = ?self.state, to = ?next, "{}", message);
        self.state = next;
        observer.on_event(ProgressEvent::StateChanged {
            state: next,
            message,
        });
    }

    /// Enter Failed and report the error. Cleanup has already happened.
    fn fail(&mut self, error: PipelineError, observer: &dyn ProgressObserver) -> RunOutcome {
        debug_assert!(self.state.can_transition_to(PipelineState::Failed));
        tracing::error!(kind = %error.kind(), from = ?self.state, "{}", error);
        self.state = PipelineState::Failed;
        observer.on_event(ProgressEvent::Failed {
            kind: error.kind(),
            message: error.to_string(),
        });
        RunOutcome::Failed(error)
    }
}
