//! Store configuration.

/// Configuration for an [`EventStore`](crate::EventStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Flush the log after every append.
    ///
    /// Leaving this on is what makes an acknowledged `append` durable;
    /// turning it off is only sensible for bulk test fixtures.
    pub sync_on_write: bool,

    /// Chain each appended event to its predecessor with a SHA-256 hash
    /// for tamper evidence. Verified by the integrity verifier.
    pub hash_chain: bool,
}

impl StoreConfig {
    /// Creates the default configuration: durable writes, hash chaining on.
    pub fn new() -> Self {
        Self {
            sync_on_write: true,
            hash_chain: true,
        }
    }

    /// Sets whether the log is flushed after every append.
    #[must_use]
    pub fn with_sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }

    /// Sets whether appended events are hash-chained.
    #[must_use]
    pub fn with_hash_chain(mut self, hash_chain: bool) -> Self {
        self.hash_chain = hash_chain;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_durable_and_chained() {
        let config = StoreConfig::default();
        assert!(config.sync_on_write);
        assert!(config.hash_chain);
    }

    #[test]
    fn builder_overrides() {
        let config = StoreConfig::new()
            .with_sync_on_write(false)
            .with_hash_chain(false);
        assert!(!config.sync_on_write);
        assert!(!config.hash_chain);
    }
}
