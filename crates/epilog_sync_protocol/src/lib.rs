//! Wire types for the diary sync protocol.
//!
//! Two JSON-over-HTTP exchanges:
//!
//! - **push**: `POST /sync` with every unsynced event; a `200` response
//!   acknowledges the whole batch
//! - **pull**: `POST /getRecords` returning the server's current records
//!
//! All field names are camelCase on the wire. Responses are decoded
//! leniently so older clients keep working when the server grows new
//! fields.

pub mod messages;
pub mod wire;

pub use messages::{PullRequest, PullResponse, PushRequest, PushResponse, RemoteRecord};
pub use wire::WireEvent;
