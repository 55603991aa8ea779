//! # epilog storage
//!
//! Storage backends for the epilog diary event log.
//!
//! A backend is an **opaque append-only byte store**. It never interprets
//! the bytes it holds; the log record format (envelopes, checksums, hash
//! chaining) is owned entirely by `epilog_core`.
//!
//! ## Design principles
//!
//! - Backends expose append, positional read, flush and truncate only
//! - No knowledge of event semantics or record framing
//! - `Send + Sync` so the store can serve readers during a sync cycle
//!
//! ## Available backends
//!
//! - [`FileBackend`] - durable storage over OS file APIs
//! - [`InMemoryBackend`] - ephemeral storage for tests
//!
//! ## Example
//!
//! ```rust
//! use epilog_storage::{InMemoryBackend, StorageBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"diary bytes").unwrap();
//! assert_eq!(backend.read_at(offset, 11).unwrap(), b"diary bytes");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
