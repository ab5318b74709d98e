use std::time::Duration;

use async_trait::async_trait;
use flowmind::gateway::{
    BackendError, ExecuteRequest, ExecuteResponse, ExecutionBackend, StreamFrame,
};
use flowmind::types::SessionId;

/// One scripted event on the streaming channel.
#[derive(Clone, Debug)]
pub enum StreamStep {
    Token(&'static str),
    Done(&'static str),
    Error(&'static str),
}

/// How the scripted reliable call settles.
#[derive(Clone, Debug)]
pub enum CallOutcome {
    Succeed(&'static str),
    Fail(&'static str),
}

/// Execution backend replaying a fixed script.
///
/// Stream frames are buffered into the channel at open time, tagged with
/// the session id the controller asked for; the sender is then dropped,
/// which models the channel closing after delivery. The reliable call
/// settles after `call_delay`, so the buffered frames always drain first
/// in tests that care about ordering.
pub struct ScriptedBackend {
    pub steps: Vec<StreamStep>,
    pub call: CallOutcome,
    pub call_delay: Duration,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<StreamStep>, call: CallOutcome) -> Self {
        Self {
            steps,
            call,
            call_delay: Duration::from_millis(25),
        }
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    async fn open_stream(
        &self,
        session: &SessionId,
    ) -> Result<flume::Receiver<StreamFrame>, BackendError> {
        let (tx, rx) = flume::unbounded();
        for step in &self.steps {
            let frame = match step {
                StreamStep::Token(t) => StreamFrame::token(session.clone(), *t),
                StreamStep::Done(t) => StreamFrame::done(session.clone(), *t),
                StreamStep::Error(e) => StreamFrame::error(session.clone(), *e),
            };
            let _ = tx.send(frame);
        }
        Ok(rx)
    }

    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, BackendError> {
        tokio::time::sleep(self.call_delay).await;
        match &self.call {
            CallOutcome::Succeed(output) => Ok(ExecuteResponse {
                session_id: request.session_id,
                output: (*output).to_string(),
            }),
            CallOutcome::Fail(reason) => Err(BackendError::Upstream((*reason).to_string())),
        }
    }
}
