//! Authentication token source.

use std::sync::Arc;

/// Source of the bearer token for sync requests.
///
/// Sync is strictly optional: when no token is available the engine
/// silently skips network work and the diary keeps recording locally.
/// The token lifecycle (login, refresh, expiry) lives behind this trait.
pub trait TokenProvider: Send + Sync {
    /// Returns the current bearer token, or `None` when signed out.
    fn token(&self) -> Option<String>;
}

/// A fixed token, for tests and simple deployments.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    /// Creates a provider that always returns the given token.
    pub fn new(token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            token: token.into(),
        })
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}

/// The signed-out state: never produces a token.
#[derive(Debug, Clone, Default)]
pub struct NoAuth;

impl TokenProvider for NoAuth {
    fn token(&self) -> Option<String> {
        None
    }
}
