//! Sync engine state and statistics.

use std::time::Instant;

/// The current state of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Not syncing.
    Idle,
    /// Uploading unsynced events.
    Pushing,
    /// Fetching server records.
    Pulling,
    /// Last cycle completed cleanly.
    Synced,
    /// Last cycle failed; the next one starts from scratch.
    Failed,
}

impl SyncState {
    /// Returns true while a cycle is in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::Pushing | SyncState::Pulling)
    }
}

/// Running statistics across sync cycles.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Completed sync cycles.
    pub cycles_completed: u64,
    /// Events uploaded in total.
    pub events_pushed: u64,
    /// Records fetched in total.
    pub records_pulled: u64,
    /// Retries performed.
    pub retries: u64,
    /// When the last successful cycle finished.
    pub last_sync_time: Option<Instant>,
    /// Message of the last failure, if any.
    pub last_error: Option<String>,
}

/// What one push attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The server acknowledged this many events.
    Pushed(usize),
    /// Everything was already acknowledged.
    NothingToPush,
    /// No token available; skipped silently.
    SkippedNoAuth,
    /// The server was unreachable or rejected the batch.
    Failed(String),
}

/// What one pull attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// This many remote records were appended locally.
    Pulled(usize),
    /// No token available; skipped silently.
    SkippedNoAuth,
    /// The server was unreachable or answered badly.
    Failed(String),
}

/// Combined result of one push-then-pull cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCycleReport {
    /// Push half of the cycle.
    pub push: PushOutcome,
    /// Pull half of the cycle.
    pub pull: PullOutcome,
}

impl SyncCycleReport {
    /// True when neither half failed.
    pub fn is_success(&self) -> bool {
        !matches!(self.push, PushOutcome::Failed(_)) && !matches!(self.pull, PullOutcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_states() {
        assert!(SyncState::Pushing.is_active());
        assert!(SyncState::Pulling.is_active());
        assert!(!SyncState::Idle.is_active());
        assert!(!SyncState::Failed.is_active());
    }

    #[test]
    fn cycle_success() {
        let ok = SyncCycleReport {
            push: PushOutcome::NothingToPush,
            pull: PullOutcome::Pulled(0),
        };
        assert!(ok.is_success());

        let failed = SyncCycleReport {
            push: PushOutcome::Failed("503".into()),
            pull: PullOutcome::SkippedNoAuth,
        };
        assert!(!failed.is_success());
    }
}
