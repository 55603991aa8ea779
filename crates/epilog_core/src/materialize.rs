//! Materialization: folding the event log into current-state records.
//!
//! A pure, deterministic fold. Replaying the same event sequence always
//! yields an identical projection; the store may cache the result but a
//! full re-derivation must produce the same records in the same order.

use crate::event::Event;
use crate::types::{DeviceId, EventId, EventKind, Intensity};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// Clinically relevant classification of a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    /// No active record mentions the date.
    NotRecorded,
    /// At least one completed nosebleed record.
    Nosebleed,
    /// A "no nosebleed" marker and nothing stronger.
    NoNosebleed,
    /// An "unknown" marker and nothing stronger.
    Unknown,
    /// A real record exists but lacks end time or intensity.
    Incomplete,
}

impl DayStatus {
    /// Precedence when multiple records land on one date; highest wins.
    ///
    /// A completed nosebleed is clinically significant and must not be
    /// hidden by a stray incomplete entry or a "no event" marker on the
    /// same day.
    fn precedence(self) -> u8 {
        match self {
            Self::NotRecorded => 0,
            Self::Unknown => 1,
            Self::NoNosebleed => 2,
            Self::Incomplete => 3,
            Self::Nosebleed => 4,
        }
    }

    /// Combines two statuses for the same date, keeping the stronger.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if other.precedence() > self.precedence() {
            other
        } else {
            self
        }
    }
}

/// Current-state projection of one event chain.
///
/// The `id` is the id of the *latest* event in the chain; corrections
/// mint new record ids. `parent_record_id` lets a UI trace what this
/// record replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Id of the latest event in the chain.
    pub id: EventId,
    /// Id of the event the latest event superseded, if any.
    pub parent_record_id: Option<EventId>,
    /// Calendar date of the entry.
    pub date: NaiveDate,
    /// Start time, if recorded.
    pub start_time: Option<DateTime<Utc>>,
    /// End time, if recorded.
    pub end_time: Option<DateTime<Utc>>,
    /// Severity, if recorded.
    pub intensity: Option<Intensity>,
    /// Free-text note.
    pub notes: Option<String>,
    /// Device that produced the authoritative event.
    pub device_id: DeviceId,
    /// Client-observed time of the authoritative event.
    pub recorded_at: DateTime<Utc>,
    /// True for "no nosebleed on this date" markers.
    pub is_no_nosebleed: bool,
    /// True for "unknown" markers.
    pub is_unknown: bool,
    /// True for real records missing end time or intensity.
    pub is_incomplete: bool,
    /// True when the chain ends in a deletion. Deleted records never
    /// appear in active views; this flag only serves explicit
    /// deleted-record queries.
    pub is_deleted: bool,
}

impl Record {
    /// True for the day-marker records (no-nosebleed / unknown).
    #[must_use]
    pub fn is_marker(&self) -> bool {
        self.is_no_nosebleed || self.is_unknown
    }

    /// The day status this single record contributes to its date.
    #[must_use]
    pub fn day_contribution(&self) -> DayStatus {
        if self.is_no_nosebleed {
            DayStatus::NoNosebleed
        } else if self.is_unknown {
            DayStatus::Unknown
        } else if self.is_incomplete {
            DayStatus::Incomplete
        } else {
            DayStatus::Nosebleed
        }
    }
}

/// The materialized view of an event sequence.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    active: Vec<Record>,
    deleted: Vec<Record>,
}

impl Projection {
    /// Folds an event sequence into its projection.
    ///
    /// Chains are resolved in a single linear pass: events arrive in
    /// store order, so each event's chain root is found through its
    /// parent's already-recorded root, with no recursive pointer chasing.
    /// The latest event per chain (store order, not wall clock) is
    /// authoritative. An orphaned parent pointer degrades gracefully by
    /// treating the event as its own chain root; the integrity verifier,
    /// not the materializer, reports it.
    pub fn project(events: &[Event]) -> Self {
        struct ChainState {
            latest: usize,
            latest_payload: Option<usize>,
        }

        let mut roots: HashMap<EventId, EventId> = HashMap::new();
        let mut chains: Vec<EventId> = Vec::new();
        let mut states: HashMap<EventId, ChainState> = HashMap::new();

        for (i, event) in events.iter().enumerate() {
            let root = event
                .parent_id
                .and_then(|parent| roots.get(&parent).copied())
                .unwrap_or(event.id);
            roots.insert(event.id, root);

            let state = states.entry(root).or_insert_with(|| {
                chains.push(root);
                ChainState {
                    latest: i,
                    latest_payload: None,
                }
            });
            state.latest = i;
            if !event.kind.is_delete() {
                state.latest_payload = Some(i);
            }
        }

        let mut projection = Self::default();

        for root in &chains {
            let state = &states[root];
            let latest = &events[state.latest];
            let is_deleted = latest.kind.is_delete();

            // Fields come from the latest non-deletion event; a chain
            // consisting solely of a Delete falls back to the deletion's
            // own payload (date only).
            let source = state
                .latest_payload
                .map(|i| &events[i])
                .unwrap_or(latest);

            let is_no_nosebleed = source.kind == EventKind::NoNosebleed;
            let is_unknown = source.kind == EventKind::Unknown;
            let is_real = !is_no_nosebleed && !is_unknown;
            let is_incomplete = is_real
                && (source.payload.end_time.is_none() || source.payload.intensity.is_none());

            let record = Record {
                id: latest.id,
                parent_record_id: latest.parent_id,
                date: source.payload.date,
                start_time: source.payload.start_time,
                end_time: source.payload.end_time,
                intensity: source.payload.intensity,
                notes: source.payload.notes.clone(),
                device_id: latest.device_id,
                recorded_at: latest.created_at,
                is_no_nosebleed,
                is_unknown,
                is_incomplete,
                is_deleted,
            };

            if is_deleted {
                projection.deleted.push(record);
            } else {
                projection.active.push(record);
            }
        }

        projection
    }

    /// Active records, in chain first-appearance order.
    pub fn active(&self) -> &[Record] {
        &self.active
    }

    /// Records whose chains end in a deletion.
    ///
    /// Exposed only for explicit deleted-record queries; the underlying
    /// events remain in the log permanently either way.
    pub fn deleted(&self) -> &[Record] {
        &self.deleted
    }

    /// Active records whose date equals the given calendar date.
    pub fn records_for_date(&self, date: NaiveDate) -> impl Iterator<Item = &Record> {
        self.active.iter().filter(move |r| r.date == date)
    }

    /// The aggregate status of a calendar date.
    pub fn day_status(&self, date: NaiveDate) -> DayStatus {
        self.records_for_date(date)
            .fold(DayStatus::NotRecorded, |status, record| {
                status.merge(record.day_contribution())
            })
    }
}
