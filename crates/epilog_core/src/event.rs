//! The immutable diary event.
//!
//! Events are the single source of truth. A diary entry's history is a
//! *chain*: a Create (or marker) event followed by zero or more
//! Update/Complete/Delete events, each pointing at the event it
//! supersedes via `parent_id`. Corrections never mutate; they append.
//! This is what makes the history complete and explainable (ALCOA+
//! "original" and "traceable").

use crate::types::{DeviceId, EventId, EventKind, Intensity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain fields of a diary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPayload {
    /// Calendar date the entry belongs to. Day-status grouping uses this
    /// field, never `start_time`.
    pub date: NaiveDate,
    /// When the nosebleed started, if recorded.
    pub start_time: Option<DateTime<Utc>>,
    /// When the nosebleed ended, if recorded.
    pub end_time: Option<DateTime<Utc>>,
    /// Recorded severity.
    pub intensity: Option<Intensity>,
    /// Free-text note.
    pub notes: Option<String>,
}

impl EntryPayload {
    /// Creates a payload carrying only a date.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            start_time: None,
            end_time: None,
            intensity: None,
            notes: None,
        }
    }

    /// Sets the start time.
    #[must_use]
    pub fn with_start(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Sets the end time.
    #[must_use]
    pub fn with_end(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Sets the intensity.
    #[must_use]
    pub fn with_intensity(mut self, intensity: Intensity) -> Self {
        self.intensity = Some(intensity);
        self
    }

    /// Sets the free-text note.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// An immutable diary event.
///
/// Once appended to the store an event's fields are never mutated or
/// physically removed. The one read-time exception is `synced_at`, which
/// the store overlays from its sync-mark records; the appended bytes
/// themselves are never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Writer-generated unique id.
    pub id: EventId,
    /// The event this one supersedes, if any.
    pub parent_id: Option<EventId>,
    /// What happened.
    pub kind: EventKind,
    /// Domain fields.
    pub payload: EntryPayload,
    /// The device that produced the event.
    pub device_id: DeviceId,
    /// Client-observed creation time.
    pub created_at: DateTime<Utc>,
    /// Server acknowledgment time; `None` means pending sync.
    pub synced_at: Option<DateTime<Utc>>,
    /// Policy-required free text for corrections.
    pub change_reason: Option<String>,
    /// Policy-required free text for deletions.
    pub delete_reason: Option<String>,
    /// Remote record id this event was observed from, for pulled events.
    pub remote_id: Option<Uuid>,
}

impl Event {
    fn base(kind: EventKind, device_id: DeviceId, payload: EntryPayload) -> Self {
        Self {
            id: EventId::new(),
            parent_id: None,
            kind,
            payload,
            device_id,
            created_at: Utc::now(),
            synced_at: None,
            change_reason: None,
            delete_reason: None,
            remote_id: None,
        }
    }

    /// Creates an original diary entry event.
    pub fn create(device_id: DeviceId, payload: EntryPayload) -> Self {
        Self::base(EventKind::Create, device_id, payload)
    }

    /// Creates a correction superseding `parent`.
    ///
    /// The change reason is required by recording policy; the store does
    /// not enforce it, the caller constructs a well-formed event.
    pub fn update(
        parent: EventId,
        device_id: DeviceId,
        payload: EntryPayload,
        change_reason: impl Into<String>,
    ) -> Self {
        let mut event = Self::base(EventKind::Update, device_id, payload);
        event.parent_id = Some(parent);
        event.change_reason = Some(change_reason.into());
        event
    }

    /// Creates a completion event superseding `parent`, filling in the
    /// end time and intensity of an open entry.
    pub fn complete(parent: EventId, device_id: DeviceId, payload: EntryPayload) -> Self {
        let mut event = Self::base(EventKind::Complete, device_id, payload);
        event.parent_id = Some(parent);
        event
    }

    /// Creates a soft-deletion event superseding `parent`.
    ///
    /// The deleted chain disappears from active views; every event in
    /// it, including this one, remains in the log permanently.
    pub fn delete(
        parent: EventId,
        device_id: DeviceId,
        date: NaiveDate,
        delete_reason: impl Into<String>,
    ) -> Self {
        let mut event = Self::base(EventKind::Delete, device_id, EntryPayload::for_date(date));
        event.parent_id = Some(parent);
        event.delete_reason = Some(delete_reason.into());
        event
    }

    /// Creates a "no nosebleed on this date" marker.
    pub fn no_nosebleed_marker(device_id: DeviceId, date: NaiveDate) -> Self {
        Self::base(EventKind::NoNosebleed, device_id, EntryPayload::for_date(date))
    }

    /// Creates an "unknown whether a nosebleed occurred" marker.
    pub fn unknown_marker(device_id: DeviceId, date: NaiveDate) -> Self {
        Self::base(EventKind::Unknown, device_id, EntryPayload::for_date(date))
    }

    /// Creates a Create-equivalent event for a record observed from the
    /// sync server, tagged with the remote record id.
    ///
    /// A fresh local id is minted so event ids stay globally unique even
    /// when the same remote record is fetched more than once.
    pub fn observed_remote(
        remote_id: Uuid,
        kind: EventKind,
        device_id: DeviceId,
        payload: EntryPayload,
    ) -> Self {
        let mut event = Self::base(kind, device_id, payload);
        event.remote_id = Some(remote_id);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn device() -> DeviceId {
        DeviceId::new()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn create_has_no_parent() {
        let event = Event::create(device(), EntryPayload::for_date(date()));
        assert_eq!(event.kind, EventKind::Create);
        assert!(event.parent_id.is_none());
        assert!(event.synced_at.is_none());
    }

    #[test]
    fn update_links_parent_and_reason() {
        let original = Event::create(device(), EntryPayload::for_date(date()));
        let corrected = Event::update(
            original.id,
            original.device_id,
            EntryPayload::for_date(date()).with_notes("wrong date entered"),
            "transcription error",
        );

        assert_eq!(corrected.parent_id, Some(original.id));
        assert_ne!(corrected.id, original.id);
        assert_eq!(corrected.change_reason.as_deref(), Some("transcription error"));
    }

    #[test]
    fn delete_carries_reason() {
        let original = Event::create(device(), EntryPayload::for_date(date()));
        let deletion = Event::delete(original.id, original.device_id, date(), "duplicate entry");

        assert!(deletion.kind.is_delete());
        assert_eq!(deletion.delete_reason.as_deref(), Some("duplicate entry"));
    }

    #[test]
    fn observed_remote_mints_fresh_id() {
        let remote = Uuid::new_v4();
        let event = Event::observed_remote(
            remote,
            EventKind::Create,
            device(),
            EntryPayload::for_date(date()),
        );

        assert_eq!(event.remote_id, Some(remote));
        assert_ne!(event.id.as_uuid(), remote);
    }

    #[test]
    fn payload_builder() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let payload = EntryPayload::for_date(date())
            .with_start(start)
            .with_intensity(Intensity::Dripping)
            .with_notes("while gardening");

        assert_eq!(payload.start_time, Some(start));
        assert_eq!(payload.intensity, Some(Intensity::Dripping));
        assert!(payload.end_time.is_none());
    }

    #[test]
    fn event_body_roundtrip() {
        let event = Event::create(
            device(),
            EntryPayload::for_date(date()).with_intensity(Intensity::Gushing),
        );
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: Event = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, event);
    }
}
