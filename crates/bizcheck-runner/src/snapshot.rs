//! Published run snapshots.

use bizcheck_core::{ResultEntry, RunState};

/// Read-only view of a run, published after every chunk.
///
/// Entries are ordered newest chunk first; within a chunk, original
/// input order is preserved.
#[derive(Debug, Clone, Default)]
pub struct RunSnapshot {
    /// One entry per identifier in every processed chunk.
    pub entries: Vec<ResultEntry>,
    /// Percentage of identifiers processed, `0.0..=100.0`.
    pub progress: f64,
    /// Lifecycle state of the run.
    pub state: RunState,
}
