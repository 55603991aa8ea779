//! Conversions between stored events and their wire form.

use crate::messages::RemoteRecord;
use chrono::{DateTime, NaiveDate, Utc};
use epilog_core::{DeviceId, EntryPayload, Event, EventKind, Intensity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A diary event flattened for upload.
///
/// The server stores events flat rather than nesting the payload, so
/// the wire form inlines the payload fields next to the event metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    /// Event id.
    pub id: Uuid,
    /// Superseded event id, if any.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Event kind.
    pub kind: EventKind,
    /// Calendar date of the entry.
    pub date: NaiveDate,
    /// Start time, if recorded.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// End time, if recorded.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Severity, if recorded.
    #[serde(default)]
    pub intensity: Option<Intensity>,
    /// Free-text note.
    #[serde(default)]
    pub notes: Option<String>,
    /// Originating device.
    pub device_id: Uuid,
    /// Client-observed creation time.
    pub created_at: DateTime<Utc>,
    /// Correction reason, for updates.
    #[serde(default)]
    pub change_reason: Option<String>,
    /// Deletion reason, for soft deletes.
    #[serde(default)]
    pub delete_reason: Option<String>,
}

impl WireEvent {
    /// Flattens a stored event for upload.
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id.as_uuid(),
            parent_id: event.parent_id.map(|p| p.as_uuid()),
            kind: event.kind,
            date: event.payload.date,
            start_time: event.payload.start_time,
            end_time: event.payload.end_time,
            intensity: event.payload.intensity,
            notes: event.payload.notes.clone(),
            device_id: event.device_id.as_uuid(),
            created_at: event.created_at,
            change_reason: event.change_reason.clone(),
            delete_reason: event.delete_reason.clone(),
        }
    }
}

impl RemoteRecord {
    /// Converts a pulled server record into a local event.
    ///
    /// The event gets a fresh local id and is attributed to the local
    /// device; the server record id is kept in `remote_id` so the origin
    /// stays traceable.
    pub fn into_event(self, local_device: DeviceId) -> Event {
        let kind = if self.is_no_nosebleed {
            EventKind::NoNosebleed
        } else if self.is_unknown {
            EventKind::Unknown
        } else {
            EventKind::Create
        };

        let mut payload = EntryPayload::for_date(self.date);
        payload.start_time = self.start_time;
        payload.end_time = self.end_time;
        payload.intensity = self.intensity;
        payload.notes = self.notes;

        Event::observed_remote(self.id, kind, local_device, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn wire_event_flattens_payload() {
        let event = Event::create(
            DeviceId::new(),
            EntryPayload::for_date(date())
                .with_start(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap())
                .with_intensity(Intensity::Pouring)
                .with_notes("sudden onset"),
        );

        let wire = WireEvent::from_event(&event);
        assert_eq!(wire.id, event.id.as_uuid());
        assert_eq!(wire.date, date());
        assert_eq!(wire.intensity, Some(Intensity::Pouring));
        assert_eq!(wire.notes.as_deref(), Some("sudden onset"));
        assert!(wire.parent_id.is_none());
    }

    #[test]
    fn wire_event_serializes_camel_case() {
        let event = Event::create(DeviceId::new(), EntryPayload::for_date(date()));
        let json = serde_json::to_string(&WireEvent::from_event(&event)).unwrap();

        assert!(json.contains("\"deviceId\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("\"device_id\""));
    }

    #[test]
    fn remote_record_becomes_local_create() {
        let device = DeviceId::new();
        let remote_id = Uuid::new_v4();
        let record = RemoteRecord {
            id: remote_id,
            date: date(),
            start_time: None,
            end_time: None,
            intensity: Some(Intensity::Spotting),
            notes: None,
            is_no_nosebleed: false,
            is_unknown: false,
        };

        let event = record.into_event(device);
        assert_eq!(event.kind, EventKind::Create);
        assert_eq!(event.device_id, device);
        assert_eq!(event.remote_id, Some(remote_id));
        assert_ne!(event.id.as_uuid(), remote_id);
        assert_eq!(event.payload.intensity, Some(Intensity::Spotting));
    }

    #[test]
    fn remote_marker_flags_map_to_kinds() {
        let base = RemoteRecord {
            id: Uuid::new_v4(),
            date: date(),
            start_time: None,
            end_time: None,
            intensity: None,
            notes: None,
            is_no_nosebleed: true,
            is_unknown: false,
        };
        assert_eq!(
            base.clone().into_event(DeviceId::new()).kind,
            EventKind::NoNosebleed
        );

        let unknown = RemoteRecord {
            is_no_nosebleed: false,
            is_unknown: true,
            ..base
        };
        assert_eq!(
            unknown.into_event(DeviceId::new()).kind,
            EventKind::Unknown
        );
    }
}
