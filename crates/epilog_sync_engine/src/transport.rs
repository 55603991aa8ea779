//! Transport layer abstraction for sync operations.

use crate::error::{SyncError, SyncResult};
use epilog_sync_protocol::{PullRequest, PullResponse, PushRequest};
use std::sync::Mutex;

/// Network communication with the sync server.
///
/// Abstracts the wire so the engine can be driven by an HTTP client in
/// production and a mock in tests. Both operations carry the bearer
/// token resolved by the engine.
pub trait SyncTransport: Send + Sync {
    /// Uploads a batch of events. A successful return acknowledges the
    /// whole batch.
    fn push(&self, token: &str, request: &PushRequest) -> SyncResult<()>;

    /// Fetches the server's current records.
    fn pull(&self, token: &str, request: &PullRequest) -> SyncResult<PullResponse>;
}

/// A scriptable transport for tests.
///
/// Records every request it receives and answers from preset responses;
/// an unset response simulates a network failure.
#[derive(Debug, Default)]
pub struct MockTransport {
    push_requests: Mutex<Vec<PushRequest>>,
    pull_requests: Mutex<Vec<PullRequest>>,
    push_ok: Mutex<Option<Result<(), u16>>>,
    pull_response: Mutex<Option<PullResponse>>,
    tokens_seen: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Creates a mock with no scripted responses (every call fails).
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts pushes to succeed.
    pub fn accept_pushes(&self) {
        *self.push_ok.lock().unwrap() = Some(Ok(()));
    }

    /// Scripts pushes to fail with an HTTP status.
    pub fn reject_pushes(&self, status: u16) {
        *self.push_ok.lock().unwrap() = Some(Err(status));
    }

    /// Scripts the pull response.
    pub fn set_pull_response(&self, response: PullResponse) {
        *self.pull_response.lock().unwrap() = Some(response);
    }

    /// Push requests received so far.
    pub fn push_requests(&self) -> Vec<PushRequest> {
        self.push_requests.lock().unwrap().clone()
    }

    /// Pull requests received so far.
    pub fn pull_requests(&self) -> Vec<PullRequest> {
        self.pull_requests.lock().unwrap().clone()
    }

    /// Bearer tokens presented so far, in call order.
    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

impl SyncTransport for MockTransport {
    fn push(&self, token: &str, request: &PushRequest) -> SyncResult<()> {
        self.tokens_seen.lock().unwrap().push(token.to_string());
        self.push_requests.lock().unwrap().push(request.clone());
        match *self.push_ok.lock().unwrap() {
            Some(Ok(())) => Ok(()),
            Some(Err(status)) => Err(SyncError::Http { status }),
            None => Err(SyncError::transport_retryable("mock: network unreachable")),
        }
    }

    fn pull(&self, token: &str, request: &PullRequest) -> SyncResult<PullResponse> {
        self.tokens_seen.lock().unwrap().push(token.to_string());
        self.pull_requests.lock().unwrap().push(request.clone());
        self.pull_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SyncError::transport_retryable("mock: network unreachable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscripted_mock_fails_like_a_dead_network() {
        let mock = MockTransport::new();
        let result = mock.push("t", &PushRequest { records: vec![] });
        assert!(matches!(result, Err(SyncError::Transport { .. })));
    }

    #[test]
    fn mock_records_requests_and_tokens() {
        let mock = MockTransport::new();
        mock.accept_pushes();

        mock.push("token-1", &PushRequest { records: vec![] }).unwrap();
        assert_eq!(mock.push_requests().len(), 1);
        assert_eq!(mock.tokens_seen(), vec!["token-1".to_string()]);
    }
}
