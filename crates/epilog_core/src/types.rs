//! Core identifier and domain value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a diary event.
///
/// Writer-generated v4 UUID, globally unique across devices. Each
/// correction mints a new id; an `EventId` is therefore *not* a stable
/// domain key for a diary entry; the chain root is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable per-installation device identity used to attribute events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Generates a fresh random device id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Store-assigned monotonic position of an event in the log.
///
/// Sequence order, not wall-clock order, decides which event in a chain
/// is authoritative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    /// Creates a sequence number.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the following sequence number.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Severity of a recorded nosebleed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Intensity {
    /// Occasional spotting.
    Spotting,
    /// Steady dripping.
    Dripping,
    /// Continuous pouring.
    Pouring,
    /// Gushing; typically requires intervention.
    Gushing,
}

/// The kind of a diary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Original creation of a diary entry.
    Create,
    /// Correction of an earlier event in the chain.
    Update,
    /// Completion of an entry (end time / intensity filled in).
    Complete,
    /// Soft deletion; the chain is excluded from active views.
    Delete,
    /// Marker asserting "no nosebleed occurred on this date".
    NoNosebleed,
    /// Marker asserting "it is unknown whether a nosebleed occurred".
    Unknown,
}

impl EventKind {
    /// Returns true for the day-marker kinds (no-nosebleed / unknown).
    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::NoNosebleed | Self::Unknown)
    }

    /// Returns true for the soft-deletion kind.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ids_are_unique() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn sequence_ordering() {
        let first = SequenceNumber::new(1);
        assert!(first < first.next());
        assert_eq!(first.next().as_u64(), 2);
    }

    #[test]
    fn marker_kinds() {
        assert!(EventKind::NoNosebleed.is_marker());
        assert!(EventKind::Unknown.is_marker());
        assert!(!EventKind::Create.is_marker());
        assert!(!EventKind::Delete.is_marker());
        assert!(EventKind::Delete.is_delete());
    }

    #[test]
    fn intensity_wire_names() {
        let json = serde_json::to_string(&Intensity::Dripping).unwrap();
        assert_eq!(json, "\"dripping\"");
    }
}
