//! The durable, append-only event store.

use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::log::{LogManager, LogRecord, SyncMarkBody};
use crate::types::{EventId, SequenceNumber};
use chrono::{DateTime, Utc};
use epilog_storage::{FileBackend, InMemoryBackend, StorageBackend};
use fs2::FileExt;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Advisory lock file guarding single-writer access.
const LOCK_FILE: &str = "LOCK";
/// The event log file.
const LOG_FILE: &str = "events.log";

/// An event together with its log-level metadata.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Store-assigned position in the log.
    pub sequence: SequenceNumber,
    /// Tamper-evidence chain hash, when hashing is enabled.
    pub chain_hash: Option<[u8; 32]>,
    /// The event exactly as appended (no sync overlay).
    pub event: Event,
}

#[derive(Debug, Default)]
struct StoreIndex {
    /// Events in insertion order.
    events: Vec<StoredEvent>,
    /// Sync acknowledgments folded from sync-mark records.
    synced: HashMap<EventId, DateTime<Utc>>,
    /// Sequence to assign to the next append.
    next_sequence: u64,
    /// Hash of the most recently appended event body.
    last_hash: Option<[u8; 32]>,
    /// Monotonic change counter, bumped by append/mark/reset.
    version: u64,
}

/// Durable, append-only log of diary events; the single source of truth.
///
/// The store never rejects a well-formed event for business reasons;
/// policy validation ("delete requires a reason") happens in the caller
/// before `append`. The only fatal failures are storage I/O and codec
/// errors.
///
/// # Concurrency
///
/// Single local writer; readers take snapshot clones under a read lock
/// and observe either the pre- or post-append index, never a torn state.
/// `list_unsynced` is a snapshot: events appended during a sync cycle
/// are simply picked up on the next one.
pub struct EventStore {
    log: LogManager,
    config: StoreConfig,
    index: RwLock<StoreIndex>,
    /// Held for the lifetime of the store to exclude other processes.
    _lock_file: Option<File>,
}

impl EventStore {
    /// Opens or creates a store in the given directory and replays the
    /// log into memory.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreLocked`] if another process holds the
    /// directory lock, or a corruption/IO error if replay fails.
    pub fn open(path: &Path, config: StoreConfig) -> CoreResult<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(CoreError::invalid_format(format!(
                "store path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(CoreError::StoreLocked);
        }

        let backend = FileBackend::open(&path.join(LOG_FILE))?;
        let log = LogManager::new(Box::new(backend), config.sync_on_write);
        let index = Self::replay(&log)?;

        tracing::debug!(
            events = index.events.len(),
            path = %path.display(),
            "opened event store"
        );

        Ok(Self {
            log,
            config,
            index: RwLock::new(index),
            _lock_file: Some(lock_file),
        })
    }

    /// Creates an ephemeral in-memory store, mainly for tests.
    pub fn in_memory(config: StoreConfig) -> Self {
        let backend: Box<dyn StorageBackend> = Box::new(InMemoryBackend::new());
        let log = LogManager::new(backend, config.sync_on_write);
        Self {
            log,
            config,
            index: RwLock::new(StoreIndex::default()),
            _lock_file: None,
        }
    }

    fn replay(log: &LogManager) -> CoreResult<StoreIndex> {
        let mut index = StoreIndex::default();

        for record in log.read_all()? {
            match record {
                LogRecord::Event {
                    sequence,
                    chain_hash,
                    body,
                } => {
                    let event: Event = serde_json::from_slice(&body)?;
                    index.next_sequence = index.next_sequence.max(sequence.as_u64() + 1);
                    if chain_hash.is_some() {
                        index.last_hash = chain_hash;
                    }
                    index.events.push(StoredEvent {
                        sequence,
                        chain_hash,
                        event,
                    });
                }
                LogRecord::SyncMark { body } => {
                    let mark: SyncMarkBody = serde_json::from_slice(&body)?;
                    for id in mark.event_ids {
                        index.synced.entry(id).or_insert(mark.server_time);
                    }
                }
            }
            index.version += 1;
        }

        Ok(index)
    }

    /// Durably appends one event, returning its id.
    ///
    /// There is no partial append: the framed record is written (and
    /// flushed, per config) before the in-memory index changes, so the
    /// event is either fully durable or the call fails with the index
    /// untouched.
    pub fn append(&self, event: Event) -> CoreResult<EventId> {
        let id = event.id;
        let body = serde_json::to_vec(&event)?;

        let mut index = self.index.write();

        let chain_hash = if self.config.hash_chain {
            Some(chain_digest(index.last_hash.as_ref(), &body))
        } else {
            None
        };
        let sequence = SequenceNumber::new(index.next_sequence);

        self.log.append(&LogRecord::Event {
            sequence,
            chain_hash,
            body,
        })?;

        index.next_sequence += 1;
        if chain_hash.is_some() {
            index.last_hash = chain_hash;
        }
        index.events.push(StoredEvent {
            sequence,
            chain_hash,
            event,
        });
        index.version += 1;

        tracing::debug!(%id, sequence = sequence.as_u64(), "appended event");
        Ok(id)
    }

    /// Returns all events in insertion order, with the sync-mark overlay
    /// applied to `synced_at`.
    ///
    /// Stable and replayable: the same log always yields the same
    /// sequence. This is the input to the materializer and the verifier.
    pub fn list_all(&self) -> Vec<Event> {
        let index = self.index.read();
        index
            .events
            .iter()
            .map(|stored| overlay(stored, &index.synced))
            .collect()
    }

    /// Returns a snapshot of events with no server acknowledgment.
    pub fn list_unsynced(&self) -> Vec<Event> {
        let index = self.index.read();
        index
            .events
            .iter()
            .filter(|stored| !index.synced.contains_key(&stored.event.id))
            .map(|stored| stored.event.clone())
            .collect()
    }

    /// Records a server acknowledgment for the given events.
    ///
    /// Idempotent: already-acknowledged and unknown ids are skipped, and
    /// if nothing remains no record is written at all. Returns the number
    /// of events newly marked.
    pub fn mark_synced(
        &self,
        event_ids: &[EventId],
        server_time: DateTime<Utc>,
    ) -> CoreResult<usize> {
        let mut index = self.index.write();

        let known: HashSet<EventId> =
            index.events.iter().map(|stored| stored.event.id).collect();
        let newly: Vec<EventId> = event_ids
            .iter()
            .filter(|id| known.contains(id) && !index.synced.contains_key(id))
            .copied()
            .collect();

        if newly.is_empty() {
            return Ok(0);
        }

        let body = serde_json::to_vec(&SyncMarkBody {
            event_ids: newly.clone(),
            server_time,
        })?;
        self.log.append(&LogRecord::SyncMark { body })?;

        for id in &newly {
            index.synced.insert(*id, server_time);
        }
        index.version += 1;

        Ok(newly.len())
    }

    /// Returns the number of events with no server acknowledgment.
    ///
    /// An event-level proxy for "entries not yet backed up"; one diary
    /// entry may contribute several unsynced events from its chain.
    pub fn unsynced_count(&self) -> usize {
        let index = self.index.read();
        index
            .events
            .iter()
            .filter(|stored| !index.synced.contains_key(&stored.event.id))
            .count()
    }

    /// Returns the number of events in the store.
    pub fn len(&self) -> usize {
        self.index.read().events.len()
    }

    /// Returns true if the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.index.read().events.is_empty()
    }

    /// Monotonic change counter; bumps on append, mark and reset.
    ///
    /// Lets read layers cache a projection and re-derive it only when
    /// the store actually changed.
    pub fn version(&self) -> u64 {
        self.index.read().version
    }

    /// Returns events with their log-level metadata (sequence numbers
    /// and chain hashes), for the integrity verifier.
    pub fn stored(&self) -> Vec<StoredEvent> {
        self.index.read().events.clone()
    }

    /// Whether appended events are hash-chained.
    pub fn hash_chain_enabled(&self) -> bool {
        self.config.hash_chain
    }

    /// Erases all events and acknowledgments.
    ///
    /// **Destructive**: this breaks the audit-trail guarantee and exists
    /// only for tests and administrative "wipe this installation" flows.
    /// Production code paths must never call it.
    pub fn reset(&self) -> CoreResult<()> {
        let mut index = self.index.write();
        self.log.clear()?;

        let version = index.version + 1;
        *index = StoreIndex {
            version,
            ..StoreIndex::default()
        };

        tracing::warn!("event store reset: audit log erased");
        Ok(())
    }
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("events", &self.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// `SHA-256(prev_hash || body)`; the genesis event hashes the body alone.
fn chain_digest(prev: Option<&[u8; 32]>, body: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    if let Some(prev) = prev {
        hasher.update(prev);
    }
    hasher.update(body);
    hasher.finalize().into()
}

fn overlay(stored: &StoredEvent, synced: &HashMap<EventId, DateTime<Utc>>) -> Event {
    let mut event = stored.event.clone();
    if event.synced_at.is_none() {
        event.synced_at = synced.get(&event.id).copied();
    }
    event
}
