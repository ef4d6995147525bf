//! Pipeline states and the allowed transitions between them.

use std::fmt;

/// Idle → CheckingConnectivity → Fetching → [Verifying] → Extracting →
/// Finalizing → Finished; any non-terminal state may move to Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    CheckingConnectivity,
    Fetching,
    Verifying,
    Extracting,
    Finalizing,
    Finished,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Finished | PipelineState::Failed)
    }

    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, CheckingConnectivity)
                | (CheckingConnectivity, Fetching)
                | (Fetching, Verifying)
                | (Fetching, Extracting)
                | (Verifying, Extracting)
                | (Extracting, Finalizing)
                | (Finalizing, Finished)
        )
    }

    /// Status line shown when the state is entered.
    pub fn label(self) -> &'static str {
        match self {
            PipelineState::Idle => "Waiting",
            PipelineState::CheckingConnectivity => "Checking connection..",
            PipelineState::Fetching => "Downloading file",
            PipelineState::Verifying => "Verifying integrity",
            PipelineState::Extracting => "Extracting files",
            PipelineState::Finalizing => "Finalizing",
            PipelineState::Finished => "Finished",
            PipelineState::Failed => "Failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
