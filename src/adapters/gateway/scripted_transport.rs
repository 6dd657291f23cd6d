//! Scripted HTTP transport for testing.
//!
//! Replies are consumed in order; once the script is empty the fallback reply
//! (if any) repeats. Every call is recorded with its request and the tokio
//! instant it arrived, so tests running with paused time can assert exact
//! backoff delays.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::ports::{HttpTransport, TransportError, TransportRequest, TransportResponse};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond(TransportResponse),
    Fail(TransportError),
    /// Never completes; exercises the client's per-attempt timeout.
    Hang,
}

/// Recorded call for assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: TransportRequest,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct ScriptState {
    replies: VecDeque<ScriptedReply>,
    fallback: Option<ScriptedReply>,
    calls: Vec<RecordedCall>,
}

/// Transport that answers from a script and records calls.
///
/// # Example
///
/// ```ignore
/// let transport = ScriptedTransport::new();
/// transport.push_json(200, json!({ "success": true, ... }));
/// transport.always(ScriptedReply::Fail(TransportError::network("down")));
///
/// let client = GatewayClient::new(Some(credentials), base, Arc::new(transport.clone()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Script
    // ════════════════════════════════════════════════════════════════════════════

    pub fn push(&self, reply: ScriptedReply) {
        self.state().replies.push_back(reply);
    }

    /// Queues a JSON response with the given status.
    pub fn push_json(&self, status: u16, body: Value) {
        self.push(ScriptedReply::Respond(TransportResponse {
            status,
            body: body.to_string(),
        }));
    }

    /// Queues a raw text response with the given status.
    pub fn push_text(&self, status: u16, body: impl Into<String>) {
        self.push(ScriptedReply::Respond(TransportResponse {
            status,
            body: body.into(),
        }));
    }

    pub fn push_failure(&self, error: TransportError) {
        self.push(ScriptedReply::Fail(error));
    }

    pub fn push_hang(&self) {
        self.push(ScriptedReply::Hang);
    }

    /// Reply used whenever the script is empty.
    pub fn always(&self, reply: ScriptedReply) {
        self.state().fallback = Some(reply);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Time elapsed between consecutive calls.
    pub fn gaps_between_calls(&self) -> Vec<Duration> {
        self.state()
            .calls
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let reply = {
            let mut state = self.state();
            state.calls.push(RecordedCall {
                request,
                at: Instant::now(),
            });
            state.replies.pop_front().or_else(|| state.fallback.clone())
        };

        match reply {
            Some(ScriptedReply::Respond(response)) => Ok(response),
            Some(ScriptedReply::Fail(error)) => Err(error),
            Some(ScriptedReply::Hang) => std::future::pending().await,
            None => Err(TransportError::network("no scripted reply")),
        }
    }
}
