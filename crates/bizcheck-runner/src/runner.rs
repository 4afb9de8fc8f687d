//! The batch runner.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use bizcheck_client::{ClientError, StatusLookup, MAX_BATCH_SIZE};
use bizcheck_core::{
    normalize_identifier, parse_identifiers, Progress, ResultEntry, RunState, StatusRecord,
};

use crate::handle::RunHandle;
use crate::snapshot::RunSnapshot;

/// Runner tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Identifiers per upstream request. Must not exceed the endpoint
    /// cap of 100.
    pub chunk_size: usize,

    /// Pause between chunks. Courtesy toward the upstream service, not
    /// a correctness requirement; zero disables it.
    pub chunk_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_BATCH_SIZE,
            chunk_delay: Duration::from_millis(50),
        }
    }
}

/// Drives a full run from raw input to a reconciled result set.
///
/// One chunk is in flight at a time; chunk N is fully reconciled and
/// published before chunk N+1 is issued. `start` and `reset` both
/// invalidate any previous run, so a stale in-flight run can never
/// publish over the run that replaced it.
pub struct BatchRunner<C> {
    client: Arc<C>,
    config: RunnerConfig,
    snapshot_tx: Arc<watch::Sender<RunSnapshot>>,
    active: Arc<Mutex<Option<RunHandle>>>,
}

impl<C> Clone for BatchRunner<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config,
            snapshot_tx: self.snapshot_tx.clone(),
            active: self.active.clone(),
        }
    }
}

impl<C> BatchRunner<C>
where
    C: StatusLookup + Send + Sync + 'static,
{
    /// Create a runner with default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, RunnerConfig::default())
    }

    /// Create a runner with explicit configuration.
    pub fn with_config(client: C, config: RunnerConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(RunSnapshot::default());
        Self {
            client: Arc::new(client),
            config,
            snapshot_tx: Arc::new(snapshot_tx),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Subscribe to run snapshots. The receiver always holds the latest
    /// published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Start a run over raw multi-line input.
    ///
    /// Any previous run is invalidated and cancelled. The returned
    /// handle is the caller's only way to cancel this run.
    pub fn start(&self, input: &str) -> RunHandle {
        let handle = self.begin_run();
        let runner = self.clone();
        let run_handle = handle.clone();
        let input = input.to_string();
        tokio::spawn(async move {
            runner.run(&input, &run_handle).await;
        });
        handle
    }

    /// Clear all accumulated state and return to Idle, even mid-run.
    pub fn reset(&self) {
        let previous = self.active.lock().unwrap().take();
        if let Some(previous) = previous {
            debug!(run_id = %previous.run_id(), "reset invalidates active run");
            previous.cancel();
        }
        self.snapshot_tx.send_replace(RunSnapshot::default());
    }

    /// Register a fresh handle as the active run, superseding any
    /// previous one.
    fn begin_run(&self) -> RunHandle {
        let handle = RunHandle::new();
        let mut active = self.active.lock().unwrap();
        if let Some(previous) = active.take() {
            debug!(run_id = %previous.run_id(), "superseding active run");
            previous.cancel();
        }
        *active = Some(handle.clone());
        handle
    }

    /// Execute a run to completion. Public surface is `start`; this is
    /// separate so tests can drive the loop without spawning.
    async fn run(&self, input: &str, handle: &RunHandle) {
        let identifiers = parse_identifiers(input);
        if identifiers.is_empty() {
            debug!("no identifiers after parsing; nothing to do");
            self.publish(handle, RunSnapshot::default());
            return;
        }

        let total = identifiers.len();
        let chunk_count = total.div_ceil(self.config.chunk_size);
        let mut progress = Progress::new(total);
        let mut entries: Vec<ResultEntry> = Vec::new();

        info!(total, chunk_count, "starting lookup run");
        self.publish(handle, self.snapshot(&entries, &progress, RunState::Processing));

        for (index, chunk) in identifiers.chunks(self.config.chunk_size).enumerate() {
            if handle.is_cancelled() {
                info!(processed = progress.processed(), total, "run cancelled");
                self.publish(handle, self.snapshot(&entries, &progress, RunState::Cancelled));
                return;
            }

            let normalized: Vec<String> =
                chunk.iter().map(|id| normalize_identifier(id)).collect();

            let batch = match self.client.lookup_batch(&normalized, handle.token()).await {
                Ok(records) => reconcile(chunk, records),
                Err(ClientError::Cancelled) => {
                    // Deliberate stop: no placeholder entries for this
                    // chunk or any later one.
                    info!(processed = progress.processed(), total, "run cancelled mid-chunk");
                    self.publish(handle, self.snapshot(&entries, &progress, RunState::Cancelled));
                    return;
                }
                Err(err) => {
                    warn!(chunk = index, error = %err, "chunk lookup failed");
                    let message = err.to_string();
                    chunk
                        .iter()
                        .map(|id| ResultEntry::failed(id.clone(), message.clone()))
                        .collect()
                }
            };

            // Newest chunk goes in front of everything accumulated so
            // far, keeping its own input order.
            let mut merged = batch;
            merged.append(&mut entries);
            entries = merged;

            progress.advance(chunk.len());
            debug!(
                chunk = index,
                processed = progress.processed(),
                percent = progress.percent(),
                "chunk reconciled"
            );
            self.publish(handle, self.snapshot(&entries, &progress, RunState::Processing));

            if index + 1 < chunk_count && !self.config.chunk_delay.is_zero() {
                tokio::time::sleep(self.config.chunk_delay).await;
            }
        }

        info!(total, "run completed");
        self.publish(handle, self.snapshot(&entries, &progress, RunState::Completed));
    }

    fn snapshot(&self, entries: &[ResultEntry], progress: &Progress, state: RunState) -> RunSnapshot {
        RunSnapshot {
            entries: entries.to_vec(),
            progress: progress.percent(),
            state,
        }
    }

    /// Publish a snapshot, unless this run has been superseded by a
    /// newer `start` or a `reset`.
    fn publish(&self, handle: &RunHandle, snapshot: RunSnapshot) {
        let active = self.active.lock().unwrap();
        let is_active = active
            .as_ref()
            .is_some_and(|current| current.run_id() == handle.run_id());
        if !is_active {
            debug!(run_id = %handle.run_id(), "dropping snapshot from superseded run");
            return;
        }
        self.snapshot_tx.send_replace(snapshot);
    }
}

/// Match a chunk's response records back to the identifiers that were
/// requested, in request order.
///
/// The API omits identifiers it cannot match, so absence from the
/// response is a per-entry soft failure, not a transport error.
fn reconcile(requested: &[String], records: Vec<StatusRecord>) -> Vec<ResultEntry> {
    let by_number: HashMap<String, StatusRecord> = records
        .into_iter()
        .map(|record| (record.b_no.clone(), record))
        .collect();

    requested
        .iter()
        .map(|original| {
            let number = normalize_identifier(original);
            match by_number.get(&number) {
                Some(record) => ResultEntry::matched(original.clone(), record.clone()),
                None => ResultEntry::unmatched(original.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    fn record(b_no: &str) -> StatusRecord {
        StatusRecord {
            b_no: b_no.to_string(),
            b_stt: "계속사업자".to_string(),
            b_stt_cd: "01".to_string(),
            tax_type: "부가가치세 일반과세자".to_string(),
            tax_type_cd: "01".to_string(),
            ..Default::default()
        }
    }

    fn http_500() -> ClientError {
        ClientError::Http {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            message: None,
        }
    }

    /// Scripted lookup double: pops one pre-seeded response per call,
    /// records every request, and asserts calls never overlap.
    struct ScriptedLookup {
        responses: Mutex<VecDeque<Result<Vec<StatusRecord>, ClientError>>>,
        calls: Mutex<Vec<Vec<String>>>,
        in_flight: AtomicUsize,
        cancel_after_calls: Option<usize>,
    }

    impl ScriptedLookup {
        fn new(responses: Vec<Result<Vec<StatusRecord>, ClientError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                cancel_after_calls: None,
            }
        }

        /// Simulate the user hitting cancel while call N is in flight.
        fn cancel_after_calls(mut self, calls: usize) -> Self {
            self.cancel_after_calls = Some(calls);
            self
        }

        /// Echo every requested identifier back as a matched record.
        fn echo() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                cancel_after_calls: None,
            }
        }

        fn call_sizes(&self) -> Vec<usize> {
            self.calls.lock().unwrap().iter().map(Vec::len).collect()
        }
    }

    #[async_trait]
    impl StatusLookup for ScriptedLookup {
        async fn lookup_batch(
            &self,
            identifiers: &[String],
            cancel: &CancellationToken,
        ) -> Result<Vec<StatusRecord>, ClientError> {
            let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst);
            assert_eq!(in_flight, 0, "chunk requests must never overlap");

            let call_count = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(identifiers.to_vec());
                calls.len()
            };
            if self.cancel_after_calls == Some(call_count) {
                cancel.cancel();
            }

            let response = match self.responses.lock().unwrap().pop_front() {
                Some(scripted) => scripted,
                None => Ok(identifiers.iter().map(|id| record(id)).collect()),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            response
        }
    }

    fn test_config(chunk_size: usize) -> RunnerConfig {
        RunnerConfig {
            chunk_size,
            chunk_delay: Duration::ZERO,
        }
    }

    async fn run_to_end(runner: &BatchRunner<ScriptedLookup>, input: &str) -> RunSnapshot {
        let handle = runner.begin_run();
        runner.run(input, &handle).await;
        runner.subscribe().borrow().clone()
    }

    #[tokio::test]
    async fn test_one_entry_per_identifier() {
        let runner = BatchRunner::with_config(ScriptedLookup::echo(), test_config(2));
        let snapshot = run_to_end(&runner, "111\n222\n333\n444\n555").await;

        assert_eq!(snapshot.entries.len(), 5);
        assert_eq!(snapshot.progress, 100.0);
        assert_eq!(snapshot.state, RunState::Completed);
        assert!(snapshot.entries.iter().all(|entry| entry.success));
    }

    #[tokio::test]
    async fn test_matched_entry_carries_record_fields() {
        let lookup = ScriptedLookup::new(vec![Ok(vec![record("1234567890")])]);
        let runner = BatchRunner::with_config(lookup, test_config(100));
        let snapshot = run_to_end(&runner, "123-45-67890").await;

        let entry = &snapshot.entries[0];
        assert!(entry.success);
        assert_eq!(entry.identifier, "123-45-67890");
        assert_eq!(entry.record, record("1234567890"));
    }

    #[tokio::test]
    async fn test_omitted_identifier_becomes_soft_failure() {
        // Upstream matches 111 and 333 but silently drops 222.
        let lookup = ScriptedLookup::new(vec![Ok(vec![record("111"), record("333")])]);
        let runner = BatchRunner::with_config(lookup, test_config(100));
        let snapshot = run_to_end(&runner, "111\n222\n333").await;

        assert_eq!(snapshot.entries.len(), 3);
        let missing = &snapshot.entries[1];
        assert_eq!(missing.identifier, "222");
        assert!(!missing.success);
        assert!(missing.error_message.as_deref().is_some_and(|m| !m.is_empty()));
        assert!(snapshot.entries[0].success);
        assert!(snapshot.entries[2].success);
        assert_eq!(snapshot.state, RunState::Completed);
    }

    #[tokio::test]
    async fn test_chunk_failure_softens_and_run_continues() {
        let lookup = ScriptedLookup::new(vec![Err(http_500())]);
        let runner = BatchRunner::with_config(lookup, test_config(2));
        let snapshot = run_to_end(&runner, "111\n222\n333").await;

        assert_eq!(snapshot.entries.len(), 3);
        assert_eq!(snapshot.state, RunState::Completed);
        assert_eq!(snapshot.progress, 100.0);

        // Newest chunk first: the succeeding second chunk sits in front
        // of the failed first one.
        assert_eq!(snapshot.entries[0].identifier, "333");
        assert!(snapshot.entries[0].success);
        for entry in &snapshot.entries[1..] {
            assert!(!entry.success);
            let message = entry.error_message.as_deref().unwrap();
            assert!(message.contains("500"), "unexpected message: {message}");
        }
    }

    #[tokio::test]
    async fn test_cancellation_truncates_run() {
        let lookup = ScriptedLookup::echo().cancel_after_calls(1);
        let runner = BatchRunner::with_config(lookup, test_config(2));
        let snapshot = run_to_end(&runner, "111\n222\n333\n444\n555\n666").await;

        // Only chunk 1 of 3 made it through; no placeholders for the rest.
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.state, RunState::Cancelled);
        assert!(snapshot.progress < 100.0);
    }

    #[tokio::test]
    async fn test_cancelled_call_emits_no_placeholders() {
        let lookup =
            ScriptedLookup::new(vec![Err(ClientError::Cancelled)]).cancel_after_calls(1);
        let runner = BatchRunner::with_config(lookup, test_config(2));
        let snapshot = run_to_end(&runner, "111\n222\n333").await;

        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.state, RunState::Cancelled);
    }

    #[tokio::test]
    async fn test_101_identifiers_make_two_sequential_chunks() {
        let input: String = (0..101)
            .map(|n| format!("{:010}\n", n))
            .collect();
        let runner = BatchRunner::new(ScriptedLookup::echo());
        let handle = runner.begin_run();
        runner.run(&input, &handle).await;

        assert_eq!(runner.client.call_sizes(), vec![100, 1]);
        let snapshot = runner.subscribe().borrow().clone();
        assert_eq!(snapshot.entries.len(), 101);
        assert_eq!(snapshot.state, RunState::Completed);
    }

    #[tokio::test]
    async fn test_newest_chunk_first_input_order_within() {
        let runner = BatchRunner::with_config(ScriptedLookup::echo(), test_config(2));
        let snapshot = run_to_end(&runner, "111\n222\n333\n444").await;

        let order: Vec<&str> = snapshot
            .entries
            .iter()
            .map(|entry| entry.identifier.as_str())
            .collect();
        assert_eq!(order, vec!["333", "444", "111", "222"]);
    }

    #[tokio::test]
    async fn test_empty_input_stays_idle_without_network() {
        let runner = BatchRunner::with_config(ScriptedLookup::echo(), test_config(2));
        let snapshot = run_to_end(&runner, "\n  \n---\n").await;

        assert_eq!(snapshot.state, RunState::Idle);
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.progress, 0.0);
        assert!(runner.client.call_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let runner = BatchRunner::with_config(ScriptedLookup::echo(), test_config(2));
        let snapshot = run_to_end(&runner, "111\n222\n333").await;
        assert_eq!(snapshot.state, RunState::Completed);

        runner.reset();
        let snapshot = runner.subscribe().borrow().clone();
        assert_eq!(snapshot.state, RunState::Idle);
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.progress, 0.0);
    }

    #[tokio::test]
    async fn test_superseded_run_cannot_publish() {
        let runner = BatchRunner::with_config(ScriptedLookup::echo(), test_config(2));
        let stale = runner.begin_run();
        let _current = runner.begin_run();

        // The stale run still executes, but none of its snapshots land.
        runner.run("111\n222", &stale).await;

        let snapshot = runner.subscribe().borrow().clone();
        assert_eq!(snapshot.state, RunState::Idle);
        assert!(snapshot.entries.is_empty());
    }

    #[tokio::test]
    async fn test_start_publishes_incrementally() {
        // A real (small) inter-chunk delay so the subscriber observes
        // the partial snapshot instead of a coalesced final one.
        let config = RunnerConfig {
            chunk_size: 1,
            chunk_delay: Duration::from_millis(20),
        };
        let runner = BatchRunner::with_config(ScriptedLookup::echo(), config);
        let mut snapshots = runner.subscribe();

        let handle = runner.start("111\n222");
        let mut seen_partial = false;
        loop {
            snapshots.changed().await.unwrap();
            let snapshot = snapshots.borrow_and_update().clone();
            if snapshot.state == RunState::Processing && !snapshot.entries.is_empty() {
                seen_partial = true;
            }
            if snapshot.state.is_terminal() {
                assert_eq!(snapshot.state, RunState::Completed);
                assert_eq!(snapshot.entries.len(), 2);
                break;
            }
        }
        assert!(seen_partial, "expected at least one partial snapshot");
        assert!(!handle.is_cancelled());
    }
}
