//! The storage backend trait.

use crate::error::StorageResult;

/// An opaque append-only byte store.
///
/// Backends carry the diary event log without interpreting it. The
/// contract the event store relies on:
///
/// - `append` either persists the whole buffer and returns its offset,
///   or fails with no partial write observable through `read_at`
/// - `read_at` returns exactly the bytes previously appended
/// - `truncate` exists solely for the destructive administrative
///   `reset()` path and for discarding a torn tail during recovery
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadPastEnd`](crate::StorageError::ReadPastEnd)
    /// if the requested range extends beyond the current size.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends bytes to the end of the store, returning the offset at
    /// which they were written.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes buffered writes to the OS.
    fn flush(&mut self) -> StorageResult<()>;

    /// Forces all written data onto durable media.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current size in bytes.
    fn size(&self) -> StorageResult<u64>;

    /// Discards all data beyond `new_size`.
    fn truncate(&mut self, new_size: u64) -> StorageResult<()>;
}
