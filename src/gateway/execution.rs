//! Execution boundary consumed by the session controller.
//!
//! A backend exposes two coupled surfaces for one query: an incremental
//! streaming channel keyed by session id, and a reliable request/response
//! call returning the authoritative output. The session controller opens
//! both, merges their events, and never assumes either arrives first.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{SessionId, WorkflowId};

/// Server→client event on the streaming channel.
///
/// The serde form matches the channel's wire format:
/// `{"type":"token","token":...}`, `{"type":"done","text":...}`,
/// `{"type":"error","error":...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamPayload {
    /// A text fragment to append to the in-progress assistant message.
    Token { token: String },
    /// The complete final text; authoritative over any partial
    /// concatenation, which may have arrived out of order or with gaps.
    Done { text: String },
    /// A terminal failure for this turn.
    Error { error: String },
}

/// One streaming-channel event, tagged with its owning session.
///
/// The tag is what lets a controller discard late frames from a torn-down
/// turn: a frame whose session does not match the live turn never mutates
/// the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFrame {
    pub session: SessionId,
    #[serde(flatten)]
    pub payload: StreamPayload,
}

impl StreamFrame {
    pub fn token(session: SessionId, token: impl Into<String>) -> Self {
        Self {
            session,
            payload: StreamPayload::Token {
                token: token.into(),
            },
        }
    }

    pub fn done(session: SessionId, text: impl Into<String>) -> Self {
        Self {
            session,
            payload: StreamPayload::Done { text: text.into() },
        }
    }

    pub fn error(session: SessionId, error: impl Into<String>) -> Self {
        Self {
            session,
            payload: StreamPayload::Error {
                error: error.into(),
            },
        }
    }
}

/// One transcript entry rendered for the execution request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

/// The reliable call's request payload for one turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub workflow_id: WorkflowId,
    pub query: String,
    pub session_id: SessionId,
    /// Credentials extracted from node configs (`embedding`, `openai`,
    /// `gemini`, `grok`, `serp`).
    pub api_keys: FxHashMap<String, String>,
    /// Every node's full config, keyed by node id, for backend use.
    pub node_configs: FxHashMap<String, serde_json::Value>,
    /// Transcript so far, as role/content pairs.
    pub chat_history: Vec<HistoryMessage>,
}

/// The reliable call's response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub session_id: SessionId,
    pub output: String,
}

/// Failures from the execution boundary.
#[derive(Debug, Error, Diagnostic)]
pub enum BackendError {
    /// The backend rejected the request payload.
    #[error("invalid execution request: {0}")]
    #[diagnostic(code(flowmind::backend::invalid))]
    Invalid(String),

    /// The backend or something behind it failed while executing.
    #[error("upstream execution failure: {0}")]
    #[diagnostic(code(flowmind::backend::upstream))]
    Upstream(String),
}

/// Backend executor for workflow queries.
///
/// `open_stream` returns the receiving half of the turn's streaming
/// channel; a disconnected receiver models the channel closing (with or
/// without a terminal event having been delivered). `execute` is the
/// reliable call and settles exactly once.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Open the streaming channel for a session. Frames arrive in
    /// delivery order; the channel is never reused across turns.
    async fn open_stream(
        &self,
        session: &SessionId,
    ) -> Result<flume::Receiver<StreamFrame>, BackendError>;

    /// Issue the reliable call for a turn and await its single response.
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, BackendError>;
}
