//! Run handles for cancellation scoping.

use bizcheck_core::RunId;
use tokio_util::sync::CancellationToken;

/// Token identifying one run, returned by `start()` and owned by the
/// caller.
///
/// Cancellation is cooperative: the runner checks the handle before
/// each chunk and passes its token into the in-flight call so the call
/// itself aborts promptly. Entries already published for completed
/// chunks are never rolled back.
#[derive(Debug, Clone)]
pub struct RunHandle {
    run_id: RunId,
    cancel: CancellationToken,
}

impl RunHandle {
    pub(crate) fn new() -> Self {
        Self {
            run_id: RunId::generate(),
            cancel: CancellationToken::new(),
        }
    }

    /// The id scoping this run's snapshots.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Request that the run stop after the current chunk.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.cancel
    }
}
