//! Read-only views over the materialized projection.

use crate::materialize::{DayStatus, Projection, Record};
use crate::store::EventStore;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Read-only query surface over an event store.
///
/// The projection is derived lazily and cached against the store's
/// change counter, so repeated queries between writes fold the log only
/// once. A cached projection is byte-identical to a full replay by
/// construction; the cache is keyed, never patched.
pub struct QueryEngine {
    store: Arc<EventStore>,
    cache: Mutex<Option<(u64, Arc<Projection>)>>,
}

impl QueryEngine {
    /// Creates a query engine over the given store.
    pub fn new(store: Arc<EventStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(None),
        }
    }

    /// The default trailing window for [`recent_records`](Self::recent_records).
    pub fn default_recent_window() -> Duration {
        Duration::hours(24)
    }

    /// Returns the current projection, re-deriving it if the store
    /// changed since the last query.
    pub fn projection(&self) -> Arc<Projection> {
        let version = self.store.version();
        let mut cache = self.cache.lock();

        if let Some((cached_version, projection)) = cache.as_ref() {
            if *cached_version == version {
                return Arc::clone(projection);
            }
        }

        let projection = Arc::new(Projection::project(&self.store.list_all()));
        *cache = Some((version, Arc::clone(&projection)));
        projection
    }

    /// Active records whose date equals the given calendar date.
    pub fn records_for_date(&self, date: NaiveDate) -> Vec<Record> {
        self.projection()
            .records_for_date(date)
            .cloned()
            .collect()
    }

    /// Active records still missing an end time or intensity.
    pub fn incomplete_records(&self) -> Vec<Record> {
        self.projection()
            .active()
            .iter()
            .filter(|r| r.is_incomplete)
            .cloned()
            .collect()
    }

    /// Active records whose start time falls within the default 24-hour
    /// trailing window, ascending by start time.
    pub fn recent_records(&self, now: DateTime<Utc>) -> Vec<Record> {
        self.recent_records_within(now, Self::default_recent_window())
    }

    /// Active records whose start time falls within the trailing window
    /// ending at `now`, ascending by start time.
    ///
    /// Records without a start time are excluded even if otherwise
    /// eligible.
    pub fn recent_records_within(&self, now: DateTime<Utc>, window: Duration) -> Vec<Record> {
        let cutoff = now - window;
        let mut records: Vec<Record> = self
            .projection()
            .active()
            .iter()
            .filter(|r| {
                r.start_time
                    .map(|start| start >= cutoff && start <= now)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        records.sort_by_key(|r| r.start_time);
        records
    }

    /// The aggregate status of a calendar date.
    pub fn day_status(&self, date: NaiveDate) -> DayStatus {
        self.projection().day_status(date)
    }

    /// Day statuses for every date from `start` through `end`, both
    /// inclusive. An inverted range yields nothing.
    pub fn day_status_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, DayStatus)> {
        let projection = self.projection();
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| (date, projection.day_status(date)))
            .collect()
    }

    /// Whether any active record exists for the day before `today`.
    pub fn has_records_for_yesterday(&self, today: NaiveDate) -> bool {
        match today.pred_opt() {
            Some(yesterday) => self
                .projection()
                .records_for_date(yesterday)
                .next()
                .is_some(),
            None => false,
        }
    }

    /// Number of events not yet acknowledged by the server.
    ///
    /// A proxy for "entries pending backup", surfaced non-blockingly in
    /// the UI; one entry may have several unsynced events in its chain.
    pub fn unsynced_count(&self) -> usize {
        self.store.unsynced_count()
    }
}
