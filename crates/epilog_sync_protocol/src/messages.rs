//! Request and response bodies.

use crate::wire::WireEvent;
use chrono::{DateTime, NaiveDate, Utc};
use epilog_core::Intensity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /sync`: every unsynced event, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    /// Events to upload.
    pub records: Vec<WireEvent>,
}

/// Body of a `200` response to `POST /sync`.
///
/// The status code alone acknowledges the batch; every body field is
/// optional so the client tolerates both empty bodies and servers that
/// echo extra detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResponse {
    /// Number of records the server accepted, when reported.
    #[serde(default)]
    pub accepted: Option<usize>,
    /// Server-side processing time, when reported.
    #[serde(default)]
    pub server_time: Option<DateTime<Utc>>,
}

/// Body of `POST /getRecords`. Currently carries nothing; the bearer
/// token identifies whose records to return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {}

/// Body of a `200` response to `POST /getRecords`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResponse {
    /// The server's current records.
    #[serde(default)]
    pub records: Vec<RemoteRecord>,
}

/// A diary record as the server reports it.
///
/// The server returns materialized records, not event chains, so a
/// pulled record carries current-state fields plus the marker flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRecord {
    /// Server-side record id.
    pub id: Uuid,
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
    /// True for "no nosebleed on this date" markers.
    #[serde(default)]
    pub is_no_nosebleed: bool,
    /// True for "unknown" markers.
    #[serde(default)]
    pub is_unknown: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_response_tolerates_empty_body() {
        let decoded: PushResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(decoded, PushResponse::default());
    }

    #[test]
    fn push_response_tolerates_unknown_fields() {
        let decoded: PushResponse =
            serde_json::from_str(r#"{"accepted": 3, "quotaRemaining": 97}"#).unwrap();
        assert_eq!(decoded.accepted, Some(3));
    }

    #[test]
    fn pull_response_field_names_are_camel_case() {
        let json = r#"{
            "records": [{
                "id": "6a2f90de-31f5-4c7e-9a46-9fcd4a8e3c21",
                "date": "2024-01-15",
                "startTime": "2024-01-15T10:00:00Z",
                "intensity": "dripping",
                "isNoNosebleed": false
            }]
        }"#;

        let decoded: PullResponse = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.records.len(), 1);
        let record = &decoded.records[0];
        assert!(record.start_time.is_some());
        assert_eq!(record.intensity, Some(Intensity::Dripping));
        assert!(record.end_time.is_none());
        assert!(!record.is_no_nosebleed);
    }

    #[test]
    fn marker_flags_default_to_false() {
        let json = r#"{"id": "6a2f90de-31f5-4c7e-9a46-9fcd4a8e3c21", "date": "2024-01-15"}"#;
        let record: RemoteRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_no_nosebleed);
        assert!(!record.is_unknown);
    }
}
