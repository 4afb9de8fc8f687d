//! Run progress tracking.

use serde::{Deserialize, Serialize};

/// Fraction of identifiers processed so far, as a 0-100 percentage.
///
/// `advance` only ever adds, so the percentage is monotonically
/// non-decreasing within a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    processed: usize,
    total: usize,
}

impl Progress {
    /// Start tracking a run over `total` identifiers.
    pub fn new(total: usize) -> Self {
        Self { processed: 0, total }
    }

    /// Record `count` more identifiers as processed.
    pub fn advance(&mut self, count: usize) {
        self.processed += count;
    }

    /// Identifiers processed so far.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Identifiers requested for the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Percentage in `0.0..=100.0`; 0 for an empty run.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.processed as f64 / self.total as f64 * 100.0).min(100.0)
    }
}
