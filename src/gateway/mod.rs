//! External interfaces the core consumes: workflow persistence and the
//! backend execution boundary.
//!
//! Neither surface is implemented by the core beyond the volatile
//! [`InMemoryWorkflowStore`]; real deployments supply their own
//! [`WorkflowStore`] and [`ExecutionBackend`] implementations and the
//! session layer stays unchanged.

mod execution;
mod store;

pub use execution::{
    BackendError, ExecuteRequest, ExecuteResponse, ExecutionBackend, HistoryMessage, StreamFrame,
    StreamPayload,
};
pub use store::{
    ChatRecord, InMemoryWorkflowStore, StoreError, StoredWorkflow, WorkflowDraft, WorkflowStore,
    WorkflowSummary,
};
