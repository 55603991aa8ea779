//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted behind a trait so different
//! libraries (reqwest, ureq, a platform webview bridge) can provide the
//! wire without this crate depending on any of them.

use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use epilog_sync_protocol::{PullRequest, PullResponse, PushRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Push endpoint path.
pub const PUSH_ENDPOINT: &str = "/sync";
/// Pull endpoint path.
pub const PULL_ENDPOINT: &str = "/getRecords";

/// A raw HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// HTTP client abstraction.
pub trait HttpClient: Send + Sync {
    /// Sends a JSON POST with a bearer token, returning status and body.
    ///
    /// An `Err` means the request never completed (DNS, connect, read
    /// failure); a completed request with a failure status comes back as
    /// `Ok` with that status.
    fn post(&self, url: &str, bearer_token: &str, body: Vec<u8>) -> Result<HttpResponse, String>;
}

/// HTTP-based sync transport using JSON bodies.
pub struct HttpTransport<C: HttpClient> {
    base_url: String,
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport against the given base URL.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post_json<Req, Res>(&self, endpoint: &str, token: &str, request: &Req) -> SyncResult<Res>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)
            .map_err(|e| SyncError::Protocol(format!("failed to encode request: {e}")))?;

        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url, token, body)
            .map_err(SyncError::transport_retryable)?;

        if response.status != 200 {
            return Err(SyncError::Http {
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| SyncError::Protocol(format!("failed to decode response: {e}")))
    }
}

impl<C: HttpClient> SyncTransport for HttpTransport<C> {
    fn push(&self, token: &str, request: &PushRequest) -> SyncResult<()> {
        // The status code is the acknowledgment; the body is advisory
        let _response: epilog_sync_protocol::PushResponse =
            self.post_json(PUSH_ENDPOINT, token, request)?;
        Ok(())
    }

    fn pull(&self, token: &str, request: &PullRequest) -> SyncResult<PullResponse> {
        self.post_json(PULL_ENDPOINT, token, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedClient {
        responses: Mutex<Vec<Result<HttpResponse, String>>>,
        urls: Mutex<Vec<String>>,
        tokens: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<HttpResponse, String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                urls: Mutex::new(Vec::new()),
                tokens: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for ScriptedClient {
        fn post(
            &self,
            url: &str,
            bearer_token: &str,
            _body: Vec<u8>,
        ) -> Result<HttpResponse, String> {
            self.urls.lock().unwrap().push(url.to_string());
            self.tokens.lock().unwrap().push(bearer_token.to_string());
            self.responses.lock().unwrap().remove(0)
        }
    }

    #[test]
    fn push_hits_sync_endpoint_with_token() {
        let client = ScriptedClient::new(vec![Ok(HttpResponse {
            status: 200,
            body: b"{}".to_vec(),
        })]);
        let transport = HttpTransport::new("https://api.example.com", client);

        transport
            .push("secret", &PushRequest { records: vec![] })
            .unwrap();

        assert_eq!(
            transport.client.urls.lock().unwrap().as_slice(),
            ["https://api.example.com/sync"]
        );
        assert_eq!(
            transport.client.tokens.lock().unwrap().as_slice(),
            ["secret"]
        );
    }

    #[test]
    fn non_200_is_an_http_error() {
        let client = ScriptedClient::new(vec![Ok(HttpResponse {
            status: 401,
            body: Vec::new(),
        })]);
        let transport = HttpTransport::new("https://api.example.com", client);

        let result = transport.push("expired", &PushRequest { records: vec![] });
        assert!(matches!(result, Err(SyncError::Http { status: 401 })));
    }

    #[test]
    fn network_failure_is_retryable_transport_error() {
        let client = ScriptedClient::new(vec![Err("connection refused".to_string())]);
        let transport = HttpTransport::new("https://api.example.com", client);

        let result = transport.pull("t", &PullRequest {});
        match result {
            Err(err) => assert!(err.is_retryable()),
            Ok(_) => panic!("expected transport error"),
        }
    }

    #[test]
    fn garbage_pull_body_is_a_protocol_error() {
        let client = ScriptedClient::new(vec![Ok(HttpResponse {
            status: 200,
            body: b"not json".to_vec(),
        })]);
        let transport = HttpTransport::new("https://api.example.com", client);

        let result = transport.pull("t", &PullRequest {});
        assert!(matches!(result, Err(SyncError::Protocol(_))));
    }
}
