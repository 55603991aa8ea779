//! The push/pull sync engine.

use crate::auth::TokenProvider;
use crate::config::SyncConfig;
use crate::state::{PullOutcome, PushOutcome, SyncCycleReport, SyncState, SyncStats};
use crate::transport::SyncTransport;
use chrono::Utc;
use epilog_core::{CoreResult, DeviceId, EventId, EventStore};
use epilog_sync_protocol::{PullRequest, PushRequest, WireEvent};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

/// Best-effort synchronization of the local event log with the server.
///
/// Recording never depends on this engine: every operation degrades to a
/// skipped or failed *outcome* when the network or credentials are
/// missing, and the only hard errors it can return are local storage
/// failures. Events stay queued (unsynced) until a push is acknowledged,
/// so no outcome here ever loses data.
pub struct SyncEngine<T: SyncTransport> {
    store: Arc<EventStore>,
    device: DeviceId,
    tokens: Arc<dyn TokenProvider>,
    transport: T,
    config: SyncConfig,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
}

impl<T: SyncTransport> SyncEngine<T> {
    /// Creates an engine over the given store and transport.
    pub fn new(
        store: Arc<EventStore>,
        device: DeviceId,
        tokens: Arc<dyn TokenProvider>,
        transport: T,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            device,
            tokens,
            transport,
            config,
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// The engine's current state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// A snapshot of the running statistics.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// The engine's configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Uploads every unsynced event in one batch.
    ///
    /// On a `200` the exact pushed ids are marked acknowledged, stamped
    /// with the engine's clock (the server ack carries no timestamp).
    /// Transport and server failures are swallowed into the outcome;
    /// only local storage errors propagate.
    pub fn sync_all_records(&self) -> CoreResult<PushOutcome> {
        let Some(token) = self.tokens.token() else {
            tracing::debug!("push skipped: signed out");
            return Ok(PushOutcome::SkippedNoAuth);
        };

        let unsynced = self.store.list_unsynced();
        if unsynced.is_empty() {
            return Ok(PushOutcome::NothingToPush);
        }

        *self.state.write() = SyncState::Pushing;

        let ids: Vec<EventId> = unsynced.iter().map(|e| e.id).collect();
        let request = PushRequest {
            records: unsynced.iter().map(WireEvent::from_event).collect(),
        };

        match self.transport.push(&token, &request) {
            Ok(()) => {
                self.store.mark_synced(&ids, Utc::now())?;
                let mut stats = self.stats.write();
                stats.events_pushed += ids.len() as u64;
                tracing::debug!(count = ids.len(), "pushed events");
                *self.state.write() = SyncState::Synced;
                Ok(PushOutcome::Pushed(ids.len()))
            }
            Err(error) => {
                tracing::warn!(%error, count = ids.len(), "push failed, events stay queued");
                *self.state.write() = SyncState::Failed;
                Ok(PushOutcome::Failed(error.to_string()))
            }
        }
    }

    /// Fetches the server's records and appends them locally.
    ///
    /// Each remote record becomes a Create-equivalent event with a fresh
    /// local id, tagged with the server record id, and is immediately
    /// marked acknowledged so the next push does not echo it back.
    /// Records are not deduplicated against earlier pulls.
    pub fn fetch_records_from_cloud(&self) -> CoreResult<PullOutcome> {
        let Some(token) = self.tokens.token() else {
            tracing::debug!("pull skipped: signed out");
            return Ok(PullOutcome::SkippedNoAuth);
        };

        *self.state.write() = SyncState::Pulling;

        let response = match self.transport.pull(&token, &PullRequest {}) {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "pull failed");
                *self.state.write() = SyncState::Failed;
                return Ok(PullOutcome::Failed(error.to_string()));
            }
        };

        let now = Utc::now();
        let mut appended = Vec::with_capacity(response.records.len());
        for record in response.records {
            let event = record.into_event(self.device);
            appended.push(self.store.append(event)?);
        }
        if !appended.is_empty() {
            self.store.mark_synced(&appended, now)?;
        }

        let mut stats = self.stats.write();
        stats.records_pulled += appended.len() as u64;
        tracing::debug!(count = appended.len(), "pulled records");
        *self.state.write() = SyncState::Synced;
        Ok(PullOutcome::Pulled(appended.len()))
    }

    /// Runs one push-then-pull cycle.
    pub fn sync(&self) -> CoreResult<SyncCycleReport> {
        let push = self.sync_all_records()?;
        let pull = self.fetch_records_from_cloud()?;
        let report = SyncCycleReport { push, pull };

        let mut stats = self.stats.write();
        if report.is_success() {
            stats.cycles_completed += 1;
            stats.last_sync_time = Some(Instant::now());
            stats.last_error = None;
            *self.state.write() = SyncState::Synced;
        } else {
            stats.last_error = Some(match (&report.push, &report.pull) {
                (PushOutcome::Failed(reason), _) => reason.clone(),
                (_, PullOutcome::Failed(reason)) => reason.clone(),
                _ => "sync failed".to_string(),
            });
            *self.state.write() = SyncState::Failed;
        }

        Ok(report)
    }

    /// Runs sync cycles until one succeeds or attempts are exhausted,
    /// sleeping the configured backoff between attempts.
    pub fn sync_with_retry(&self) -> CoreResult<SyncCycleReport> {
        let mut report = self.sync()?;

        for attempt in 1..self.config.retry.max_attempts {
            if report.is_success() {
                break;
            }
            let delay = self.config.retry.delay_for_attempt(attempt);
            tracing::debug!(attempt, ?delay, "retrying sync cycle");
            std::thread::sleep(delay);
            self.stats.write().retries += 1;
            report = self.sync()?;
        }

        Ok(report)
    }
}

impl<T: SyncTransport> std::fmt::Debug for SyncEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("device", &self.device)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
