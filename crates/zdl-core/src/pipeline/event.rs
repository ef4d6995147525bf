//! Events emitted by the pipeline and the observer seam that receives them.
//!
//! Delivery is one-way and never blocks the worker: every observer impl here
//! pushes into a channel and ignores a receiver that has gone away.

use std::sync::mpsc;

use super::error::ErrorKind;
use super::state::PipelineState;
use crate::progress::TransferProgress;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A state was entered. Precedes every `Progress` event of that state.
    StateChanged {
        state: PipelineState,
        message: String,
    },
    /// Per-chunk progress of Fetching or Verifying, and the final 100% of Finalizing.
    Progress(TransferProgress),
    /// Remote object size, sent once before the first fetch chunk.
    SizeKnown(u64),
    /// Outcome of the connectivity preflight.
    ConnectivityResult(bool),
    /// Terminal failure, sent after cleanup.
    Failed { kind: ErrorKind, message: String },
}

/// Consumer of pipeline events. Called on the worker thread; must not block.
pub trait ProgressObserver {
    fn on_event(&self, event: ProgressEvent);
}

impl ProgressObserver for tokio::sync::mpsc::UnboundedSender<ProgressEvent> {
    fn on_event(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

impl ProgressObserver for mpsc::Sender<ProgressEvent> {
    fn on_event(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

/// Discards every event.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_event(&self, _event: ProgressEvent) {}
}
