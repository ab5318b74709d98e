//! Workflow graph data model and invariant-preserving mutations.
//!
//! [`WorkflowGraph`] is the single owner of node and edge state for one
//! open workflow. Editors address components by id and mutate them through
//! the operations here; there is never a second writable copy of a node's
//! configuration. The structural invariant the model maintains is that no
//! edge ever references a missing node: endpoints are checked when an edge
//! is added, and removing a node cascades to every edge touching it.
//!
//! Kind/port compatibility is deliberately *not* checked when an edge is
//! added; that is a [`validator`](crate::graph::validator) concern, so the
//! editor can always record what the user drew and report problems as a
//! batch.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::ComponentKind;
use crate::utils::IdGenerator;

/// Free-form per-kind configuration attached to a node.
///
/// The core treats this as opaque except for the credential fields the
/// session controller extracts at submission time.
pub type NodeConfig = Map<String, Value>;

/// A typed processing stage in a workflow graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    /// Unique within the graph, assigned at creation, immutable thereafter.
    pub id: String,
    /// The component's type, driving port layout and validation.
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Free-form configuration, shallow-merged by [`WorkflowGraph::update_node_config`].
    #[serde(default)]
    pub config: NodeConfig,
}

/// A directed connection from a named output port to a named input port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    /// Id of the node the edge leaves.
    pub source: String,
    /// Id of the node the edge enters.
    pub target: String,
    /// Logical output port on the source node (e.g. `context`).
    #[serde(rename = "sourceHandle", default)]
    pub source_handle: String,
    /// Logical input port on the target node (e.g. `query`).
    #[serde(rename = "targetHandle", default)]
    pub target_handle: String,
}

/// Serde form of a graph, as persisted by the gateway.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(default)]
    pub nodes: Vec<ComponentNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Errors from graph mutations and definition loading.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// A node id referenced by an operation does not exist in the graph.
    #[error("node not found: {id}")]
    #[diagnostic(
        code(flowmind::graph::node_not_found),
        help("The node may have been removed by another editor action.")
    )]
    NodeNotFound { id: String },

    /// An edge id referenced by an operation does not exist in the graph.
    #[error("edge not found: {id}")]
    #[diagnostic(code(flowmind::graph::edge_not_found))]
    EdgeNotFound { id: String },

    /// A loaded definition violates the structural invariants.
    #[error("invalid workflow definition: {0}")]
    #[diagnostic(
        code(flowmind::graph::invalid_definition),
        help("Check the persisted definition for duplicate ids or dangling edge endpoints.")
    )]
    InvalidDefinition(String),
}

/// The editable workflow graph: insertion-ordered nodes and edges.
///
/// Insertion order is part of the model's contract: credential extraction
/// scans nodes in the order they were added ("last one wins" for repeated
/// keys), and serialization is deterministic.
///
/// # Examples
///
/// ```
/// use flowmind::graph::WorkflowGraph;
/// use flowmind::types::ComponentKind;
///
/// let mut graph = WorkflowGraph::new();
/// let query = graph.add_node(ComponentKind::UserQuery, Default::default()).id.clone();
/// let output = graph.add_node(ComponentKind::Output, Default::default()).id.clone();
/// graph.add_edge(&query, "query", &output, "input").unwrap();
///
/// assert_eq!(graph.nodes().len(), 2);
/// assert_eq!(graph.edges().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct WorkflowGraph {
    nodes: Vec<ComponentNode>,
    edges: Vec<Edge>,
    ids: IdGenerator,
}

impl WorkflowGraph {
    /// Creates a new, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node of the given kind with its initial configuration and
    /// returns it. The id is minted here and never changes.
    pub fn add_node(&mut self, kind: ComponentKind, initial_config: NodeConfig) -> &ComponentNode {
        let id = self.ids.generate_node_id(&kind);
        tracing::debug!(node = %id, kind = %kind, "adding node");
        self.nodes.push(ComponentNode {
            id,
            kind,
            config: initial_config,
        });
        self.nodes.last().expect("node just pushed")
    }

    /// Removes a node and cascades removal of every edge touching it.
    ///
    /// Returns the removed node so callers can offer undo.
    pub fn remove_node(&mut self, id: &str) -> Result<ComponentNode, GraphError> {
        let ix = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })?;
        let node = self.nodes.remove(ix);
        let before = self.edges.len();
        self.edges.retain(|e| e.source != id && e.target != id);
        tracing::debug!(
            node = %id,
            cascaded_edges = before - self.edges.len(),
            "removed node"
        );
        Ok(node)
    }

    /// Adds an edge between two existing nodes' named ports.
    ///
    /// Both endpoints must exist; port/kind compatibility is not checked
    /// here. Multiple edges may share a source or target port.
    pub fn add_edge(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Result<&Edge, GraphError> {
        if !self.has_node(source) {
            return Err(GraphError::NodeNotFound {
                id: source.to_string(),
            });
        }
        if !self.has_node(target) {
            return Err(GraphError::NodeNotFound {
                id: target.to_string(),
            });
        }
        self.edges.push(Edge {
            id: self.ids.generate_connection_id(),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: source_handle.to_string(),
            target_handle: target_handle.to_string(),
        });
        Ok(self.edges.last().expect("edge just pushed"))
    }

    /// Removes an edge by id, returning it.
    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, GraphError> {
        let ix = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::EdgeNotFound { id: id.to_string() })?;
        Ok(self.edges.remove(ix))
    }

    /// Shallow-merges a patch into a node's configuration.
    ///
    /// Existing keys not present in the patch are preserved; keys in the
    /// patch overwrite. The configuration is never replaced wholesale, so
    /// concurrent editor panels patching different fields compose.
    pub fn update_node_config(&mut self, id: &str, patch: NodeConfig) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })?;
        for (key, value) in patch {
            node.config.insert(key, value);
        }
        Ok(())
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ComponentNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// All nodes, in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[ComponentNode] {
        &self.nodes
    }

    /// All edges, in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether any node of the given kind is present.
    #[must_use]
    pub fn contains_kind(&self, kind: &ComponentKind) -> bool {
        self.nodes.iter().any(|n| &n.kind == kind)
    }

    /// Ids of all nodes of the given kind, in insertion order.
    pub fn nodes_of_kind<'a>(
        &'a self,
        kind: &'a ComponentKind,
    ) -> impl Iterator<Item = &'a ComponentNode> {
        self.nodes.iter().filter(move |n| &n.kind == kind)
    }

    /// Whether the node with this id is the source of at least one edge.
    #[must_use]
    pub fn is_edge_source(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.source == id)
    }

    /// Whether the node with this id is the target of at least one edge.
    #[must_use]
    pub fn is_edge_target(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.target == id)
    }

    /// Clones the graph into its persisted serde form.
    #[must_use]
    pub fn to_definition(&self) -> WorkflowDefinition {
        WorkflowDefinition {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Rebuilds a graph from a persisted definition, re-establishing the
    /// structural invariants.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidDefinition`] on duplicate node/edge ids or an
    /// edge whose endpoint does not name a node in the definition.
    pub fn from_definition(definition: WorkflowDefinition) -> Result<Self, GraphError> {
        let mut seen_nodes = rustc_hash::FxHashSet::default();
        for node in &definition.nodes {
            if !seen_nodes.insert(node.id.as_str()) {
                return Err(GraphError::InvalidDefinition(format!(
                    "duplicate node id: {}",
                    node.id
                )));
            }
        }
        let mut seen_edges = rustc_hash::FxHashSet::default();
        for edge in &definition.edges {
            if !seen_edges.insert(edge.id.as_str()) {
                return Err(GraphError::InvalidDefinition(format!(
                    "duplicate edge id: {}",
                    edge.id
                )));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !seen_nodes.contains(endpoint.as_str()) {
                    return Err(GraphError::InvalidDefinition(format!(
                        "edge {} references missing node {}",
                        edge.id, endpoint
                    )));
                }
            }
        }
        Ok(Self {
            nodes: definition.nodes,
            edges: definition.edges,
            ids: IdGenerator::new(),
        })
    }
}
