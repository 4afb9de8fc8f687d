//! Run lifecycle state.

use serde::{Deserialize, Serialize};

/// State of a lookup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// No run active; also the post-reset state.
    #[default]
    Idle,
    /// Chunks are being processed.
    Processing,
    /// The run processed every chunk.
    Completed,
    /// The run was stopped early by user request.
    Cancelled,
}

impl RunState {
    /// Returns true if the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns true if chunks are still being processed.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Processing)
    }
}
