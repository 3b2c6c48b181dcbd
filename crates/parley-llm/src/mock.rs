//! Mock chat endpoint for deterministic testing.
//!
//! Returns pre-configured replies without making any HTTP calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::provider::*;
use parley_core::{ParleyError, Result, Turn};

/// A mock endpoint that replays queued responses in order.
///
/// # Example
/// ```
/// use parley_llm::mock::MockEndpoint;
/// let endpoint = MockEndpoint::new()
///     .with_invocation("echo", "{\"x\": \"hi\"}")
///     .with_text("done");
/// ```
#[derive(Default)]
pub struct MockEndpoint {
    responses: Mutex<VecDeque<MockResponse>>,
    /// Track all requests received (for assertions in tests).
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

/// A pre-configured outcome of one `complete` call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this body as if it came off the wire.
    Completion(ChatCompletion),
    /// Fail before any body is received.
    TransportFailure(String),
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain-text assistant reply.
    pub fn with_text(self, text: &str) -> Self {
        self.with_reply(Turn::assistant(text))
    }

    /// Queue a capability invocation.
    pub fn with_invocation(self, name: &str, arguments: impl Into<Value>) -> Self {
        self.with_reply(Turn::invocation(name, arguments))
    }

    /// Queue an arbitrary reply turn.
    pub fn with_reply(self, reply: Turn) -> Self {
        self.with_mock_response(MockResponse::Completion(ChatCompletion::from_reply(reply)))
    }

    /// Queue an error body without `choices`.
    pub fn with_api_error(self, message: &str, error_type: &str) -> Self {
        self.with_mock_response(MockResponse::Completion(ChatCompletion {
            error: Some(ApiError {
                message: Some(message.to_string()),
                error_type: Some(error_type.to_string()),
            }),
            ..Default::default()
        }))
    }

    /// Queue a network-level failure.
    pub fn with_transport_failure(self, message: &str) -> Self {
        self.with_mock_response(MockResponse::TransportFailure(message.to_string()))
    }

    /// Queue a fully custom response.
    pub fn with_mock_response(self, resp: MockResponse) -> Self {
        self.responses.lock().push_back(resp);
        self
    }

    /// Get all requests that were made to this endpoint.
    pub fn recorded_requests(&self) -> Arc<Mutex<Vec<ChatRequest>>> {
        Arc::clone(&self.requests)
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }

    fn next_response(&self) -> MockResponse {
        self.responses.lock().pop_front().unwrap_or_else(|| {
            MockResponse::Completion(ChatCompletion::from_reply(Turn::assistant(
                "(mock: no more queued responses)",
            )))
        })
    }
}

#[async_trait]
impl ChatEndpoint for MockEndpoint {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        self.requests.lock().push(request.clone());
        match self.next_response() {
            MockResponse::Completion(c) => Ok(c),
            MockResponse::TransportFailure(msg) => Err(ParleyError::transport(msg)),
        }
    }
}
