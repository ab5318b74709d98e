//! Execution sessions: one query's lifecycle from submission to a
//! converged transcript.
//!
//! The [`SessionController`] owns the conversation. For each turn it
//! mints a session id, appends the user message optimistically, opens the
//! streaming channel, issues the reliable call, and merges both sources
//! under the session-id-tagging discipline: the last authoritative write
//! wins, and failures are reported once.
//!
//! # Quick Start
//!
//! ```no_run
//! use flowmind::gateway::ExecutionBackend;
//! use flowmind::graph::WorkflowGraph;
//! use flowmind::session::{SessionConfig, SessionController};
//! use flowmind::types::WorkflowId;
//!
//! # async fn example(backend: &dyn ExecutionBackend, graph: &WorkflowGraph) {
//! let mut controller =
//!     SessionController::for_workflow(WorkflowId::new("wf_1"), SessionConfig::default());
//!
//! let status = controller
//!     .run_turn(backend, graph, "What is in the knowledge base?")
//!     .await
//!     .expect("submission accepted");
//!
//! println!("turn finished as {status:?}");
//! for message in controller.transcript().messages() {
//!     println!("{}: {}", message.role, message.content);
//! }
//! # }
//! ```

mod controller;
mod extract;
mod transcript;

pub use controller::{ClosePolicy, SessionConfig, SessionController, SessionStatus, SubmitError};
pub use extract::{build_request, collect_api_keys, collect_node_configs};
pub use transcript::Transcript;
