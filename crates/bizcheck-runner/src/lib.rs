//! Batch orchestrator for BizCheck.
//!
//! Turns raw multi-line identifier input into ordered per-identifier
//! result rows by driving sequential chunked calls through a
//! [`bizcheck_client::StatusLookup`] implementation, reconciling each
//! chunk's response against what was requested, and publishing
//! `(entries, progress, state)` snapshots after every chunk.

pub mod handle;
pub mod runner;
pub mod snapshot;

pub use handle::RunHandle;
pub use runner::{BatchRunner, RunnerConfig};
pub use snapshot::RunSnapshot;
