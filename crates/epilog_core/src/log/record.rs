//! Log record types and serialization.

use crate::error::{CoreError, CoreResult};
use crate::types::{EventId, SequenceNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Magic bytes identifying an epilog log record.
pub const LOG_MAGIC: [u8; 4] = *b"EPLG";

/// Current log format version.
pub const LOG_VERSION: u16 = 1;

/// Type of log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogRecordType {
    /// An appended diary event.
    Event = 1,
    /// A server acknowledgment for a batch of events.
    SyncMark = 2,
}

impl LogRecordType {
    /// Converts a byte to a record type.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Event),
            2 => Some(Self::SyncMark),
            _ => None,
        }
    }

    /// Converts the record type to a byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Body of a sync-mark record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMarkBody {
    /// Events acknowledged by this mark.
    pub event_ids: Vec<EventId>,
    /// Acknowledgment timestamp.
    pub server_time: DateTime<Utc>,
}

/// A framed record in the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// An appended diary event.
    Event {
        /// Store-assigned monotonic sequence number.
        sequence: SequenceNumber,
        /// Tamper-evidence hash: `SHA-256(prev_hash || body)`, present
        /// when hash chaining is enabled.
        chain_hash: Option<[u8; 32]>,
        /// JSON-encoded event body.
        body: Vec<u8>,
    },

    /// A server acknowledgment for a batch of events.
    SyncMark {
        /// JSON-encoded [`SyncMarkBody`].
        body: Vec<u8>,
    },
}

impl LogRecord {
    /// Returns the record type.
    #[must_use]
    pub fn record_type(&self) -> LogRecordType {
        match self {
            Self::Event { .. } => LogRecordType::Event,
            Self::SyncMark { .. } => LogRecordType::SyncMark,
        }
    }

    /// Maximum size of a record body.
    ///
    /// The envelope length field is 4 bytes; larger bodies cannot be
    /// framed and are rejected before anything is written.
    pub const MAX_BODY_SIZE: usize = u32::MAX as usize;

    /// Serializes the record payload (without envelope).
    ///
    /// # Errors
    ///
    /// Returns an error if the body exceeds [`Self::MAX_BODY_SIZE`].
    pub fn encode_payload(&self) -> CoreResult<Vec<u8>> {
        let mut buf = Vec::new();

        match self {
            Self::Event {
                sequence,
                chain_hash,
                body,
            } => {
                if body.len() > Self::MAX_BODY_SIZE {
                    return Err(CoreError::invalid_operation(format!(
                        "event body too large: {} bytes",
                        body.len()
                    )));
                }

                buf.extend_from_slice(&sequence.as_u64().to_le_bytes());
                // chain_hash: 1 byte flag + optional 32 bytes
                if let Some(hash) = chain_hash {
                    buf.push(1);
                    buf.extend_from_slice(hash);
                } else {
                    buf.push(0);
                }
                // body: 4 byte length + data
                let len = body.len() as u32;
                buf.extend_from_slice(&len.to_le_bytes());
                buf.extend_from_slice(body);
            }

            Self::SyncMark { body } => {
                if body.len() > Self::MAX_BODY_SIZE {
                    return Err(CoreError::invalid_operation(format!(
                        "sync mark body too large: {} bytes",
                        body.len()
                    )));
                }

                let len = body.len() as u32;
                buf.extend_from_slice(&len.to_le_bytes());
                buf.extend_from_slice(body);
            }
        }

        Ok(buf)
    }

    /// Deserializes a record from its type and payload.
    pub fn decode_payload(record_type: LogRecordType, payload: &[u8]) -> CoreResult<Self> {
        let mut cursor = 0;

        let read_u64 = |cursor: &mut usize| -> CoreResult<u64> {
            if *cursor + 8 > payload.len() {
                return Err(CoreError::log_corruption("unexpected end of payload"));
            }
            let bytes: [u8; 8] = payload[*cursor..*cursor + 8]
                .try_into()
                .map_err(|_| CoreError::log_corruption("invalid u64"))?;
            *cursor += 8;
            Ok(u64::from_le_bytes(bytes))
        };

        let read_u32 = |cursor: &mut usize| -> CoreResult<u32> {
            if *cursor + 4 > payload.len() {
                return Err(CoreError::log_corruption("unexpected end of payload"));
            }
            let bytes: [u8; 4] = payload[*cursor..*cursor + 4]
                .try_into()
                .map_err(|_| CoreError::log_corruption("invalid u32"))?;
            *cursor += 4;
            Ok(u32::from_le_bytes(bytes))
        };

        let read_optional_hash = |cursor: &mut usize| -> CoreResult<Option<[u8; 32]>> {
            if *cursor >= payload.len() {
                return Err(CoreError::log_corruption("unexpected end of payload"));
            }
            let has_hash = payload[*cursor] != 0;
            *cursor += 1;
            if has_hash {
                if *cursor + 32 > payload.len() {
                    return Err(CoreError::log_corruption("unexpected end of chain hash"));
                }
                let bytes: [u8; 32] = payload[*cursor..*cursor + 32]
                    .try_into()
                    .map_err(|_| CoreError::log_corruption("invalid chain hash"))?;
                *cursor += 32;
                Ok(Some(bytes))
            } else {
                Ok(None)
            }
        };

        let read_body = |cursor: &mut usize| -> CoreResult<Vec<u8>> {
            let len = read_u32(cursor)? as usize;
            if *cursor + len > payload.len() {
                return Err(CoreError::log_corruption("unexpected end of body"));
            }
            let body = payload[*cursor..*cursor + len].to_vec();
            *cursor += len;
            Ok(body)
        };

        let record = match record_type {
            LogRecordType::Event => {
                let sequence = SequenceNumber::new(read_u64(&mut cursor)?);
                let chain_hash = read_optional_hash(&mut cursor)?;
                let body = read_body(&mut cursor)?;
                Self::Event {
                    sequence,
                    chain_hash,
                    body,
                }
            }
            LogRecordType::SyncMark => {
                let body = read_body(&mut cursor)?;
                Self::SyncMark { body }
            }
        };

        if cursor != payload.len() {
            return Err(CoreError::log_corruption(format!(
                "trailing bytes in {:?} record: expected {} bytes, got {}",
                record_type,
                cursor,
                payload.len()
            )));
        }

        Ok(record)
    }
}

/// Computes the CRC32 (IEEE polynomial) checksum of the data.
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_roundtrip() {
        for t in [LogRecordType::Event, LogRecordType::SyncMark] {
            assert_eq!(LogRecordType::from_byte(t.as_byte()), Some(t));
        }
        assert_eq!(LogRecordType::from_byte(0), None);
        assert_eq!(LogRecordType::from_byte(99), None);
    }

    #[test]
    fn event_record_roundtrip() {
        let record = LogRecord::Event {
            sequence: SequenceNumber::new(7),
            chain_hash: Some([0xAB; 32]),
            body: vec![0x7B, 0x7D],
        };
        let payload = record.encode_payload().unwrap();
        let decoded = LogRecord::decode_payload(LogRecordType::Event, &payload).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn event_record_without_hash() {
        let record = LogRecord::Event {
            sequence: SequenceNumber::new(1),
            chain_hash: None,
            body: vec![1, 2, 3],
        };
        let payload = record.encode_payload().unwrap();
        let decoded = LogRecord::decode_payload(LogRecordType::Event, &payload).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn sync_mark_roundtrip() {
        let body = serde_json::to_vec(&SyncMarkBody {
            event_ids: vec![EventId::new(), EventId::new()],
            server_time: Utc::now(),
        })
        .unwrap();
        let record = LogRecord::SyncMark { body };
        let payload = record.encode_payload().unwrap();
        let decoded = LogRecord::decode_payload(LogRecordType::SyncMark, &payload).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn trailing_bytes_rejected() {
        let record = LogRecord::Event {
            sequence: SequenceNumber::new(1),
            chain_hash: None,
            body: vec![1],
        };
        let mut payload = record.encode_payload().unwrap();
        payload.push(0xFF);

        let result = LogRecord::decode_payload(LogRecordType::Event, &payload);
        assert!(matches!(result, Err(CoreError::LogCorruption { .. })));
    }

    #[test]
    fn truncated_payload_rejected() {
        let record = LogRecord::Event {
            sequence: SequenceNumber::new(1),
            chain_hash: Some([1; 32]),
            body: vec![1, 2, 3, 4],
        };
        let payload = record.encode_payload().unwrap();

        let result = LogRecord::decode_payload(LogRecordType::Event, &payload[..payload.len() - 2]);
        assert!(matches!(result, Err(CoreError::LogCorruption { .. })));
    }

    #[test]
    fn crc32_known_vector() {
        // "123456789" is the standard IEEE CRC32 check vector
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(compute_crc32(b""), 0x0000_0000);
    }
}
