//! Log append and replay.

use crate::error::{CoreError, CoreResult};
use crate::log::record::{compute_crc32, LogRecord, LogRecordType, LOG_MAGIC, LOG_VERSION};
use epilog_storage::StorageBackend;
use parking_lot::Mutex;

/// Envelope header size: magic (4) + version (2) + type (1) + length (4).
const HEADER_SIZE: usize = 11;

/// CRC trailer size.
const CRC_SIZE: usize = 4;

/// Owns the storage backend and provides append-only writes plus full
/// replay of the event log.
///
/// The diary log for a single installation stays small (years of entries
/// are a few thousand records), so replay reads the file once and decodes
/// sequentially rather than streaming with a cursor abstraction.
pub struct LogManager {
    backend: Mutex<Box<dyn StorageBackend>>,
    sync_on_write: bool,
}

impl LogManager {
    /// Creates a log manager over the given backend.
    pub fn new(backend: Box<dyn StorageBackend>, sync_on_write: bool) -> Self {
        Self {
            backend: Mutex::new(backend),
            sync_on_write,
        }
    }

    /// Appends a record, returning the offset it was written at.
    ///
    /// The envelope and CRC are assembled in memory and written with a
    /// single backend append, so a failed call leaves either nothing or
    /// a torn tail that replay discards.
    pub fn append(&self, record: &LogRecord) -> CoreResult<u64> {
        let payload = record.encode_payload()?;

        let mut data = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
        data.extend_from_slice(&LOG_MAGIC);
        data.extend_from_slice(&LOG_VERSION.to_le_bytes());
        data.push(record.record_type().as_byte());

        let len = u32::try_from(payload.len())
            .map_err(|_| CoreError::invalid_operation("log record payload too large"))?;
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(&payload);

        let crc = compute_crc32(&data);
        data.extend_from_slice(&crc.to_le_bytes());

        let mut backend = self.backend.lock();
        let offset = backend.append(&data)?;

        if self.sync_on_write {
            backend.flush()?;
        }

        Ok(offset)
    }

    /// Replays the whole log, returning records in append order.
    ///
    /// A truncated trailing record is tolerated as clean end-of-log (a
    /// crash mid-append); checksum, magic, type and version violations
    /// are fatal corruption.
    pub fn read_all(&self) -> CoreResult<Vec<LogRecord>> {
        let backend = self.backend.lock();
        let size = backend.size()?;
        let bytes = backend.read_at(0, size as usize)?;
        drop(backend);

        let mut records = Vec::new();
        let mut cursor = 0usize;

        while cursor < bytes.len() {
            // Truncated header: tolerated end-of-log
            if bytes.len() - cursor < HEADER_SIZE {
                tracing::debug!(
                    trailing = bytes.len() - cursor,
                    "discarding torn record header at end of log"
                );
                break;
            }

            let magic = &bytes[cursor..cursor + 4];
            if magic != LOG_MAGIC {
                return Err(CoreError::log_corruption(format!(
                    "bad magic at offset {cursor}"
                )));
            }

            let version = u16::from_le_bytes([bytes[cursor + 4], bytes[cursor + 5]]);
            if version > LOG_VERSION {
                return Err(CoreError::log_corruption(format!(
                    "unsupported log version {version} at offset {cursor}"
                )));
            }

            let type_byte = bytes[cursor + 6];
            let record_type = LogRecordType::from_byte(type_byte).ok_or_else(|| {
                CoreError::log_corruption(format!(
                    "unknown record type {type_byte} at offset {cursor}"
                ))
            })?;

            let len = u32::from_le_bytes([
                bytes[cursor + 7],
                bytes[cursor + 8],
                bytes[cursor + 9],
                bytes[cursor + 10],
            ]) as usize;

            // Truncated payload or CRC: tolerated end-of-log
            if bytes.len() - cursor < HEADER_SIZE + len + CRC_SIZE {
                tracing::debug!(
                    offset = cursor,
                    "discarding torn record payload at end of log"
                );
                break;
            }

            let framed_end = cursor + HEADER_SIZE + len;
            let stored_crc = u32::from_le_bytes([
                bytes[framed_end],
                bytes[framed_end + 1],
                bytes[framed_end + 2],
                bytes[framed_end + 3],
            ]);
            let computed_crc = compute_crc32(&bytes[cursor..framed_end]);
            if stored_crc != computed_crc {
                return Err(CoreError::ChecksumMismatch {
                    expected: stored_crc,
                    actual: computed_crc,
                });
            }

            let payload = &bytes[cursor + HEADER_SIZE..framed_end];
            records.push(LogRecord::decode_payload(record_type, payload)?);

            cursor = framed_end + CRC_SIZE;
        }

        Ok(records)
    }

    /// Returns the current log size in bytes.
    pub fn size(&self) -> CoreResult<u64> {
        Ok(self.backend.lock().size()?)
    }

    /// Erases the entire log.
    ///
    /// Exists only for the store's destructive `reset()` path.
    pub fn clear(&self) -> CoreResult<()> {
        let mut backend = self.backend.lock();
        backend.truncate(0)?;
        backend.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for LogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogManager")
            .field("sync_on_write", &self.sync_on_write)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SequenceNumber;
    use epilog_storage::InMemoryBackend;

    fn create_log() -> LogManager {
        LogManager::new(Box::new(InMemoryBackend::new()), false)
    }

    fn event_record(sequence: u64, body: &[u8]) -> LogRecord {
        LogRecord::Event {
            sequence: SequenceNumber::new(sequence),
            chain_hash: None,
            body: body.to_vec(),
        }
    }

    #[test]
    fn append_and_replay() {
        let log = create_log();

        log.append(&event_record(1, b"{\"a\":1}")).unwrap();
        log.append(&event_record(2, b"{\"b\":2}")).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], event_record(1, b"{\"a\":1}"));
        assert_eq!(records[1], event_record(2, b"{\"b\":2}"));
    }

    #[test]
    fn replay_empty_log() {
        let log = create_log();
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn torn_tail_is_tolerated() {
        let mut backend = InMemoryBackend::new();

        // Write one complete record by hand, then a torn header
        let log = LogManager::new(Box::new(InMemoryBackend::new()), false);
        log.append(&event_record(1, b"ok")).unwrap();
        let complete = {
            let inner = log.backend.lock();
            let size = inner.size().unwrap();
            inner.read_at(0, size as usize).unwrap()
        };

        epilog_storage::StorageBackend::append(&mut backend, &complete).unwrap();
        epilog_storage::StorageBackend::append(&mut backend, &LOG_MAGIC).unwrap();

        let reopened = LogManager::new(Box::new(backend), false);
        let records = reopened.read_all().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn corrupted_crc_is_fatal() {
        let log = create_log();
        log.append(&event_record(1, b"payload")).unwrap();

        let mut bytes = {
            let inner = log.backend.lock();
            let size = inner.size().unwrap();
            inner.read_at(0, size as usize).unwrap()
        };
        // Flip a payload byte, leaving the stored CRC stale
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;

        let mut backend = InMemoryBackend::new();
        epilog_storage::StorageBackend::append(&mut backend, &bytes).unwrap();

        let reopened = LogManager::new(Box::new(backend), false);
        let result = reopened.read_all();
        assert!(result.is_err());
    }

    #[test]
    fn bad_magic_is_fatal() {
        let mut backend = InMemoryBackend::new();
        epilog_storage::StorageBackend::append(&mut backend, b"NOPE_not_a_log_record")
            .unwrap();

        let log = LogManager::new(Box::new(backend), false);
        let result = log.read_all();
        assert!(matches!(result, Err(CoreError::LogCorruption { .. })));
    }

    #[test]
    fn clear_erases_everything() {
        let log = create_log();
        log.append(&event_record(1, b"gone soon")).unwrap();
        assert!(log.size().unwrap() > 0);

        log.clear().unwrap();
        assert_eq!(log.size().unwrap(), 0);
        assert!(log.read_all().unwrap().is_empty());
    }
}
