//! # Flowmind: Workflow Graphs with Streaming Chat Sessions
//!
//! Flowmind is the client core of a visual AI-pipeline builder: an
//! editable graph of typed processing components, a topology validator
//! gating whether the assembled pipeline may run, and a session runtime
//! that executes conversational queries against the graph over a
//! streaming channel paired with a reliable call.
//!
//! ## Core Concepts
//!
//! - **Components**: typed stages ([`types::ComponentKind`]) with opaque,
//!   patchable configuration
//! - **Graph**: invariant-preserving node/edge mutations; no edge ever
//!   references a missing node
//! - **Validation**: every violation collected into one report, issues as
//!   data for live editor feedback
//! - **Sessions**: one turn = one session id correlating a token stream
//!   with the authoritative response; last authoritative write wins
//! - **Gateways**: persistence and execution stay behind traits the
//!   deployment implements
//!
//! ## Quick Start
//!
//! ### Building and validating a graph
//!
//! ```
//! use flowmind::graph::{WorkflowGraph, validate};
//! use flowmind::types::ComponentKind;
//!
//! let mut graph = WorkflowGraph::new();
//! let query = graph.add_node(ComponentKind::UserQuery, Default::default()).id.clone();
//! let llm = graph.add_node(ComponentKind::Llm, Default::default()).id.clone();
//! let output = graph.add_node(ComponentKind::Output, Default::default()).id.clone();
//!
//! graph.add_edge(&query, "query", &llm, "input").unwrap();
//! graph.add_edge(&llm, "output", &output, "output").unwrap();
//!
//! let report = validate(&graph);
//! assert!(report.ok, "issues: {:?}", report.issues);
//! ```
//!
//! ### Running a turn
//!
//! ```no_run
//! use flowmind::graph::WorkflowGraph;
//! use flowmind::gateway::ExecutionBackend;
//! use flowmind::session::{SessionConfig, SessionController};
//! use flowmind::types::WorkflowId;
//!
//! # async fn example(backend: &dyn ExecutionBackend, graph: &WorkflowGraph) {
//! let mut controller =
//!     SessionController::for_workflow(WorkflowId::new("wf_1"), SessionConfig::from_env());
//! let status = controller.run_turn(backend, graph, "summarize the docs").await.unwrap();
//! println!("turn finished as {status:?}");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return typed errors (`thiserror` + `miette`
//! diagnostics); validation findings are never exceptions. Nothing in
//! this crate is fatal to the process: every failure resolves to a
//! terminal transcript state or a rejected operation.
//!
//! ## Module Guide
//!
//! - [`graph`] - workflow graph model, kind registry, topology validator
//! - [`session`] - session controller, transcript store, extraction
//! - [`gateway`] - persistence and execution interfaces + in-memory store
//! - [`message`] - conversation message type
//! - [`types`] - component kinds and identifier newtypes
//! - [`telemetry`] - report rendering and tracing setup

pub mod gateway;
pub mod graph;
pub mod message;
pub mod session;
pub mod telemetry;
pub mod types;
pub mod utils;
