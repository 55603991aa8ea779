//! Push/pull synchronization for the epilog diary store.
//!
//! The engine is deliberately simple and deliberately optional: the
//! diary works fully offline, and sync is an opportunistic backup.
//! Pushing uploads every unsynced event in one batch and marks the batch
//! acknowledged only on a `200`; pulling appends the server's records as
//! new local events. Network failures degrade to outcomes, never to
//! errors, so callers can surface "pending backup" state without ever
//! blocking recording.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod state;
pub mod transport;

pub use auth::{NoAuth, StaticToken, TokenProvider};
pub use config::{RetryConfig, SyncConfig};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpResponse, HttpTransport};
pub use state::{PullOutcome, PushOutcome, SyncCycleReport, SyncState, SyncStats};
pub use transport::{MockTransport, SyncTransport};
