//! Tamper-evidence verification over the event log.
//!
//! A violation is diagnostic information, never an error: the append-only
//! log structurally cannot be "repaired", so the verifier reports rather
//! than throws, and normal read/write operation continues.

use crate::store::EventStore;
use crate::types::{EventId, SequenceNumber};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// What the verifier found wrong with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The store-assigned sequence did not increase.
    NonMonotonicSequence {
        /// Sequence of the preceding event.
        previous: SequenceNumber,
    },
    /// The same event id appears more than once.
    DuplicateEventId,
    /// A parent pointer that resolves to no event in the store.
    OrphanParent {
        /// The dangling parent id.
        parent_id: EventId,
    },
    /// An event inside an otherwise hashed log carries no chain hash.
    MissingChainHash,
    /// The chain hash does not match the recomputed digest.
    BrokenHashChain {
        /// Digest recomputed from the event body and its predecessor.
        expected: [u8; 32],
        /// Digest stored in the log.
        actual: [u8; 32],
    },
}

/// The first offending event, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Log position of the offending event.
    pub sequence: SequenceNumber,
    /// Id of the offending event.
    pub event_id: EventId,
    /// What was wrong.
    pub kind: ViolationKind,
}

/// Outcome of an integrity walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Number of events walked before stopping.
    pub checked: usize,
    /// The first violation encountered, if any.
    pub violation: Option<Violation>,
}

impl IntegrityReport {
    /// True when no violation was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violation.is_none()
    }
}

/// Validates event sequencing, parent resolution and hash-chain
/// continuity.
pub struct IntegrityVerifier;

impl IntegrityVerifier {
    /// Walks the whole store and reports the first violation, if any.
    ///
    /// Checks, in store order:
    ///
    /// 1. store-assigned sequence numbers strictly increase
    /// 2. no event id appears twice
    /// 3. every non-null `parent_id` resolves to an event in this store
    /// 4. hash-chain continuity, for events that carry a chain hash
    pub fn verify(store: &EventStore) -> IntegrityReport {
        let stored = store.stored();

        // Parent pointers may legitimately resolve anywhere in the log,
        // so membership is checked against the full id set.
        let all_ids: HashSet<EventId> = stored.iter().map(|s| s.event.id).collect();

        let mut seen: HashSet<EventId> = HashSet::new();
        let mut previous_sequence: Option<SequenceNumber> = None;
        let mut previous_hash: Option<[u8; 32]> = None;
        let mut hashing_seen = false;

        for (i, entry) in stored.iter().enumerate() {
            let fail = |kind: ViolationKind| IntegrityReport {
                checked: i,
                violation: Some(Violation {
                    sequence: entry.sequence,
                    event_id: entry.event.id,
                    kind,
                }),
            };

            if let Some(previous) = previous_sequence {
                if entry.sequence <= previous {
                    return fail(ViolationKind::NonMonotonicSequence { previous });
                }
            }
            previous_sequence = Some(entry.sequence);

            if !seen.insert(entry.event.id) {
                return fail(ViolationKind::DuplicateEventId);
            }

            if let Some(parent_id) = entry.event.parent_id {
                if !all_ids.contains(&parent_id) {
                    return fail(ViolationKind::OrphanParent { parent_id });
                }
            }

            match entry.chain_hash {
                Some(actual) => {
                    hashing_seen = true;
                    let body = match serde_json::to_vec(&entry.event) {
                        Ok(body) => body,
                        Err(_) => {
                            // Body re-serialization cannot fail for a
                            // struct that deserialized; treat it as a
                            // broken chain if it somehow does.
                            return fail(ViolationKind::BrokenHashChain {
                                expected: [0; 32],
                                actual,
                            });
                        }
                    };
                    let mut hasher = Sha256::new();
                    if let Some(previous) = previous_hash {
                        hasher.update(previous);
                    }
                    hasher.update(&body);
                    let expected: [u8; 32] = hasher.finalize().into();
                    if expected != actual {
                        return fail(ViolationKind::BrokenHashChain { expected, actual });
                    }
                    previous_hash = Some(actual);
                }
                None => {
                    if hashing_seen {
                        return fail(ViolationKind::MissingChainHash);
                    }
                }
            }
        }

        IntegrityReport {
            checked: stored.len(),
            violation: None,
        }
    }
}
