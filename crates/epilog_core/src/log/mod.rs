//! The append-only event log.
//!
//! Every appended event is framed in an enveloped record and written to
//! an [`epilog_storage`] backend before the in-memory index is updated.
//! On open, the log is replayed to rebuild the index.
//!
//! ## Record format
//!
//! ```text
//! | magic (4) | version (2) | type (1) | length (4) | payload (N) | crc32 (4) |
//! ```
//!
//! Two record types exist:
//!
//! - **Event**: a store sequence number, an optional 32-byte tamper-evidence
//!   chain hash, and the JSON-encoded event body
//! - **SyncMark**: a server acknowledgment for a batch of event ids
//!
//! Sync acknowledgments are separate records rather than in-place edits,
//! so the log stays physically append-only.
//!
//! ## Recovery policy
//!
//! Replay distinguishes **tolerated** from **fatal** conditions:
//!
//! - Truncated trailing record (crash mid-append before the flush
//!   completed): treated as clean end-of-log, the partial tail is ignored
//! - CRC mismatch, bad magic, unknown record type, unsupported version:
//!   actual corruption; the store refuses to open rather than silently
//!   lose or invent audit data
//!
//! ## Invariants
//!
//! - Records are never modified after write
//! - Replay is deterministic: same bytes, same index
//! - A failed append leaves no partial record observable after recovery

mod manager;
mod record;

pub use manager::LogManager;
pub use record::{
    compute_crc32, LogRecord, LogRecordType, SyncMarkBody, LOG_MAGIC, LOG_VERSION,
};
