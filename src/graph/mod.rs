//! Workflow graph definition and topology validation.
//!
//! This module owns the editable graph of typed components and decides
//! whether an assembled graph is a legal, executable pipeline:
//!
//! - **Model**: [`WorkflowGraph`] with invariant-preserving mutations
//!   (adding/removing nodes and edges, shallow config patches). Deleting a
//!   node cascades to every edge touching it; an edge can never reference
//!   a missing node.
//! - **Registry**: [`KindRegistry`] maps each [`ComponentKind`] to its
//!   logical ports and validation contribution, so the catalog extends
//!   beyond the built-in five kinds.
//! - **Validator**: [`validate`] collects every violation into a
//!   [`ValidationReport`] for live editor feedback; issues are data,
//!   never errors.
//!
//! # Quick Start
//!
//! ```
//! use flowmind::graph::{WorkflowGraph, validate};
//! use flowmind::types::ComponentKind;
//!
//! let mut graph = WorkflowGraph::new();
//! let q = graph.add_node(ComponentKind::UserQuery, Default::default()).id.clone();
//! let o = graph.add_node(ComponentKind::Output, Default::default()).id.clone();
//! graph.add_edge(&q, "query", &o, "output").unwrap();
//!
//! let report = validate(&graph);
//! assert!(report.ok);
//! ```
//!
//! [`ComponentKind`]: crate::types::ComponentKind

mod model;
mod registry;
mod validator;

pub use model::{ComponentNode, Edge, GraphError, NodeConfig, WorkflowDefinition, WorkflowGraph};
pub use registry::{KindProfile, KindRegistry, TopologyRule};
pub use validator::{
    MustFanOut, MustFeed, MustReceive, MustRelay, ValidationReport, validate, validate_with,
};
