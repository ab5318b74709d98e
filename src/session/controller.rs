//! Execution session state machine.
//!
//! One controller owns one open conversation: it gates submissions,
//! correlates a turn's streaming channel with its reliable call through a
//! session id, merges both sources into the transcript, and de-duplicates
//! failure reporting between them.
//!
//! The merge discipline, in order of authority:
//!
//! 1. `token` fragments append to the turn's assistant message (or
//!    materialize it on a cold start); they never overwrite an
//!    authoritative write.
//! 2. A `done` event's full text replaces the assistant message, since
//!    partial concatenation may have been delivered out of order or with
//!    gaps.
//! 3. The reliable call's success output merges with the same
//!    append-or-replace logic; whichever authoritative write arrives last
//!    wins.
//! 4. Errors surface as one assistant message each, and a reliable-call
//!    failure whose text matches the last shown message is suppressed:
//!    the transcript never shows the same error twice for one turn.
//!
//! Frames are tagged with their owning session id and discarded on
//! mismatch, so events from a torn-down turn cannot mutate a transcript
//! that has moved on.

use miette::Diagnostic;
use thiserror::Error;
use tracing::instrument;

use super::extract;
use super::transcript::Transcript;
use crate::gateway::{ChatRecord, ExecuteRequest, ExecutionBackend, StreamFrame, StreamPayload};
use crate::graph::WorkflowGraph;
use crate::message::Message;
use crate::types::{SessionId, WorkflowId};

/// Lifecycle of the controller's current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No turn in flight; submissions are accepted.
    #[default]
    Idle,
    /// A turn is in flight; submissions are rejected with `Busy`.
    Streaming,
    /// The last turn converged to an authoritative output (or ended
    /// silently with nothing to report).
    Done,
    /// The last turn ended with only failures shown.
    Failed,
}

/// What to do when the streaming channel closes without a terminal event
/// and no reliable-call success arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    /// End the turn quietly (the channel cannot be distinguished from an
    /// idle one, so nothing is reported).
    #[default]
    Silent,
    /// Surface one inferred failure message.
    SurfaceError,
}

/// Tuning for a session controller.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub close_policy: ClosePolicy,
    /// Cap on history records expanded when a conversation opens;
    /// `None` seeds everything the store returns.
    pub history_limit: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            close_policy: ClosePolicy::default(),
            history_limit: Some(50),
        }
    }
}

impl SessionConfig {
    /// Resolves configuration from the environment
    /// (`FLOWMIND_CLOSE_POLICY` = `silent`|`surface`,
    /// `FLOWMIND_HISTORY_LIMIT` = integer, `0` for unlimited).
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(policy) = std::env::var("FLOWMIND_CLOSE_POLICY") {
            config.close_policy = match policy.to_ascii_lowercase().as_str() {
                "surface" | "surface_error" => ClosePolicy::SurfaceError,
                _ => ClosePolicy::Silent,
            };
        }
        if let Ok(limit) = std::env::var("FLOWMIND_HISTORY_LIMIT") {
            if let Ok(limit) = limit.parse::<usize>() {
                config.history_limit = if limit == 0 { None } else { Some(limit) };
            }
        }
        config
    }
}

/// Rejections raised before a submission touches the network or the
/// transcript.
#[derive(Debug, Error, Diagnostic)]
pub enum SubmitError {
    /// The query was empty or whitespace-only.
    #[error("query must not be empty")]
    #[diagnostic(code(flowmind::session::empty_query))]
    EmptyQuery,

    /// No workflow is loaded into the conversation.
    #[error("no workflow is loaded")]
    #[diagnostic(
        code(flowmind::session::no_workflow),
        help("Load or save a workflow before running queries against it.")
    )]
    NoWorkflow,

    /// A turn is already in flight.
    #[error("a turn is already in flight")]
    #[diagnostic(code(flowmind::session::busy))]
    Busy,
}

/// Bookkeeping for the turn in flight.
#[derive(Debug)]
struct TurnState {
    session: SessionId,
    /// This turn has pushed an assistant message, which is necessarily
    /// the transcript's last entry (no other writer runs mid-turn).
    has_assistant: bool,
    /// An authoritative write (`done` or call success) has been applied.
    authoritative: bool,
    /// At least one failure message belongs to this turn.
    failed: bool,
    /// The channel delivered a terminal event or closed.
    stream_settled: bool,
    /// The channel closed without a terminal event.
    closed_unexpectedly: bool,
    /// The reliable call settled.
    call_settled: bool,
}

impl TurnState {
    fn new(session: SessionId) -> Self {
        Self {
            session,
            has_assistant: false,
            authoritative: false,
            failed: false,
            stream_settled: false,
            closed_unexpectedly: false,
            call_settled: false,
        }
    }
}

/// Client-side state machine for one open conversation.
///
/// The controller is the transcript's sole mutator. Within a turn, the
/// streaming channel and the reliable call race genuinely concurrently;
/// their writes are serialized through [`apply`](Self::apply) and
/// [`resolve_call`](Self::resolve_call), either fed manually (tests,
/// custom event loops) or by the [`run_turn`](Self::run_turn) driver.
pub struct SessionController {
    workflow_id: Option<WorkflowId>,
    transcript: Transcript,
    status: SessionStatus,
    turn: Option<TurnState>,
    config: SessionConfig,
}

impl SessionController {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            workflow_id: None,
            transcript: Transcript::new(),
            status: SessionStatus::Idle,
            turn: None,
            config,
        }
    }

    /// Controller for a conversation opened against a persisted workflow.
    #[must_use]
    pub fn for_workflow(workflow_id: WorkflowId, config: SessionConfig) -> Self {
        Self {
            workflow_id: Some(workflow_id),
            ..Self::new(config)
        }
    }

    pub fn set_workflow(&mut self, workflow_id: Option<WorkflowId>) {
        self.workflow_id = workflow_id;
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Read access for presentation layers; mutation stays in here.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Session id of the turn in flight, if any.
    #[must_use]
    pub fn live_session(&self) -> Option<&SessionId> {
        self.turn.as_ref().map(|t| &t.session)
    }

    /// Replaces the transcript with persisted history, newest-first
    /// records expanded to chronological `user`/`assistant` pairs.
    ///
    /// Ignored while a turn is streaming; seeding happens when a
    /// conversation opens, before any submission.
    pub fn seed_history(&mut self, mut records: Vec<ChatRecord>) {
        if self.status == SessionStatus::Streaming {
            tracing::warn!("ignoring history seed while a turn is streaming");
            return;
        }
        if let Some(limit) = self.config.history_limit {
            records.truncate(limit);
        }
        self.transcript = Transcript::seed_from_history(records);
    }

    /// Validates a submission and opens a new turn.
    ///
    /// On success the user message is already appended (optimistically,
    /// before any network activity), the controller is `Streaming`, and
    /// the returned request is ready for the reliable call under a fresh
    /// session id. Rejections leave the transcript untouched.
    pub fn begin_turn(
        &mut self,
        graph: &WorkflowGraph,
        query: &str,
    ) -> Result<ExecuteRequest, SubmitError> {
        if query.trim().is_empty() {
            return Err(SubmitError::EmptyQuery);
        }
        let workflow_id = self.workflow_id.clone().ok_or(SubmitError::NoWorkflow)?;
        if self.status == SessionStatus::Streaming {
            return Err(SubmitError::Busy);
        }

        let session = SessionId::generate();
        // History for the request excludes the query being submitted;
        // the query travels in its own field.
        let chat_history = self.transcript.as_history();
        self.transcript.push(Message::user(query));

        let request = extract::build_request(workflow_id, graph, query, session.clone(), chat_history);
        tracing::debug!(session = %session, "turn opened");
        self.status = SessionStatus::Streaming;
        self.turn = Some(TurnState::new(session));
        Ok(request)
    }

    /// Applies one streaming-channel frame to the turn it belongs to.
    ///
    /// Frames for an unknown or stale session id are discarded.
    pub fn apply(&mut self, frame: StreamFrame) {
        let Some(turn) = self.turn.as_mut() else {
            tracing::debug!(session = %frame.session, "discarding frame with no turn in flight");
            return;
        };
        if turn.session != frame.session {
            tracing::debug!(
                session = %frame.session,
                live = %turn.session,
                "discarding frame for stale session"
            );
            return;
        }
        if turn.stream_settled {
            tracing::debug!(session = %frame.session, "discarding frame after terminal event");
            return;
        }

        match frame.payload {
            StreamPayload::Token { token } => {
                if turn.authoritative {
                    // Stragglers must not dirty finalized text.
                    return;
                }
                if turn.has_assistant {
                    self.transcript.append_to_last(&token);
                } else {
                    self.transcript.push(Message::assistant(&token));
                    turn.has_assistant = true;
                }
            }
            StreamPayload::Done { text } => {
                if turn.has_assistant {
                    self.transcript.replace_last(&text);
                } else {
                    self.transcript.push(Message::assistant(&text));
                    turn.has_assistant = true;
                }
                turn.authoritative = true;
                turn.stream_settled = true;
                self.maybe_finish();
            }
            StreamPayload::Error { error } => {
                let text = format!("Error: {error}");
                if !self.transcript.last_assistant_matches(&text) {
                    self.transcript.push(Message::assistant(&text));
                    turn.has_assistant = true;
                }
                turn.failed = true;
                turn.stream_settled = true;
                self.maybe_finish();
            }
        }
    }

    /// Settles the reliable call for a turn.
    ///
    /// A success output merges with the same append-or-replace logic as a
    /// `done` event: it is the authoritative source of truth for the
    /// conversational output, applied even if the channel already
    /// delivered its terminal event. A failure surfaces unless its
    /// derived message duplicates the last one shown.
    pub fn resolve_call(&mut self, session: &SessionId, outcome: Result<String, String>) {
        let Some(turn) = self.turn.as_mut() else {
            tracing::debug!(session = %session, "discarding call result with no turn in flight");
            return;
        };
        if &turn.session != session {
            tracing::debug!(session = %session, live = %turn.session, "discarding stale call result");
            return;
        }
        if turn.call_settled {
            tracing::debug!(session = %session, "reliable call already settled");
            return;
        }
        turn.call_settled = true;

        match outcome {
            Ok(output) if !output.is_empty() => {
                if turn.has_assistant {
                    self.transcript.replace_last(&output);
                } else {
                    self.transcript.push(Message::assistant(&output));
                    turn.has_assistant = true;
                }
                turn.authoritative = true;
            }
            Ok(_) => {
                tracing::debug!(session = %session, "reliable call returned no output");
            }
            Err(reason) => {
                let text = format!("Error: {reason}");
                if self.transcript.last_assistant_matches(&text) {
                    tracing::debug!(session = %session, "suppressing duplicate failure report");
                } else {
                    self.transcript.push(Message::assistant(&text));
                    turn.has_assistant = true;
                }
                turn.failed = true;
            }
        }
        self.maybe_finish();
    }

    /// Records that the streaming channel closed.
    ///
    /// A closure after a terminal event is ordinary teardown. Without
    /// one, the closure settles the channel side of the turn; under
    /// [`ClosePolicy::SurfaceError`], if no authoritative output arrives,
    /// one inferred failure surfaces when the turn completes.
    pub fn stream_closed(&mut self, session: &SessionId) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if &turn.session != session || turn.stream_settled {
            return;
        }
        tracing::debug!(session = %session, "streaming channel closed without a terminal event");
        turn.stream_settled = true;
        turn.closed_unexpectedly = true;
        self.maybe_finish();
    }

    /// Discards the turn in flight, e.g. when the conversation view
    /// closes. Late events for the torn-down session are subsequently
    /// rejected by the session-id guard.
    pub fn abandon(&mut self) {
        if let Some(turn) = self.turn.take() {
            tracing::debug!(session = %turn.session, "abandoning turn in flight");
        }
        self.status = SessionStatus::Idle;
    }

    /// Completes the turn once both sources have settled.
    fn maybe_finish(&mut self) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if !(turn.stream_settled && turn.call_settled) {
            return;
        }

        if turn.closed_unexpectedly
            && !turn.authoritative
            && self.config.close_policy == ClosePolicy::SurfaceError
        {
            let text = "Error: streaming channel closed before completion".to_string();
            if !self.transcript.last_assistant_matches(&text) {
                self.transcript.push(Message::assistant(&text));
            }
            turn.failed = true;
        }

        self.status = if turn.authoritative {
            SessionStatus::Done
        } else if turn.failed {
            SessionStatus::Failed
        } else {
            SessionStatus::Done
        };
        tracing::debug!(session = %turn.session, status = ?self.status, "turn completed");
        self.turn = None;
    }

    /// Whether the current turn has fully settled (or none is in flight).
    #[must_use]
    pub fn turn_complete(&self) -> bool {
        self.turn.is_none()
    }

    /// Runs one full turn against a backend: opens the streaming channel
    /// under a fresh session id, issues the reliable call concurrently,
    /// and merges both sources until the turn completes. The channel is
    /// dropped (torn down) on the way out; channels are never reused
    /// across turns.
    #[instrument(skip_all, err)]
    pub async fn run_turn(
        &mut self,
        backend: &dyn ExecutionBackend,
        graph: &WorkflowGraph,
        query: &str,
    ) -> Result<SessionStatus, SubmitError> {
        let request = self.begin_turn(graph, query)?;
        let session = request.session_id.clone();

        let stream = match backend.open_stream(&session).await {
            Ok(rx) => Some(rx),
            Err(err) => {
                // The channel never opened; report it through the same
                // path as a structured channel failure. The reliable call
                // still runs and may rescue the turn.
                self.apply(StreamFrame::error(session.clone(), err.to_string()));
                None
            }
        };

        let call = backend.execute(request);
        tokio::pin!(call);
        let mut call_pending = true;
        let mut stream_open = stream.is_some();

        while !self.turn_complete() {
            tokio::select! {
                outcome = &mut call, if call_pending => {
                    call_pending = false;
                    let outcome = match outcome {
                        Ok(response) => Ok(response.output),
                        Err(err) => Err(err.to_string()),
                    };
                    self.resolve_call(&session, outcome);
                }
                frame = recv_frame(&stream), if stream_open => {
                    match frame {
                        Some(frame) => self.apply(frame),
                        None => {
                            stream_open = false;
                            self.stream_closed(&session);
                        }
                    }
                }
            }
        }

        Ok(self.status)
    }
}

async fn recv_frame(
    stream: &Option<flume::Receiver<StreamFrame>>,
) -> Option<StreamFrame> {
    match stream {
        Some(rx) => rx.recv_async().await.ok(),
        // Guarded out by `stream_open`; never polled.
        None => None,
    }
}
