//! Core engine of the epilog clinical diary store.
//!
//! An offline-first, append-only event store for nosebleed diary entries.
//! Nothing is ever edited in place: every change is a new immutable
//! [`Event`] chained to its predecessor by `parent_id`, and current state
//! is a pure fold of the log ([`Projection`]). The log is framed with
//! per-record CRCs and an optional SHA-256 hash chain for tamper
//! evidence.
//!
//! The main pieces:
//!
//! - [`EventStore`] owns the durable log and the in-memory index
//! - [`Projection`] folds events into active diary records
//! - [`QueryEngine`] caches the projection and answers date queries
//! - [`IntegrityVerifier`] audits sequencing and the hash chain
//! - [`DeviceIdentity`] attributes events to this installation

pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod integrity;
pub mod log;
pub mod materialize;
pub mod query;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use error::{CoreError, CoreResult};
pub use event::{EntryPayload, Event};
pub use identity::{DeviceIdentity, FileIdentity, FixedIdentity};
pub use integrity::{IntegrityReport, IntegrityVerifier, Violation, ViolationKind};
pub use materialize::{DayStatus, Projection, Record};
pub use query::QueryEngine;
pub use store::{EventStore, StoredEvent};
pub use types::{DeviceId, EventId, EventKind, Intensity, SequenceNumber};
