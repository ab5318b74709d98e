mod common;

use common::*;
use flowmind::graph::{GraphError, NodeConfig, WorkflowGraph};
use flowmind::types::ComponentKind;
use serde_json::json;

#[test]
fn test_add_node_assigns_unique_ids() {
    let mut graph = WorkflowGraph::new();
    let a = graph
        .add_node(ComponentKind::Llm, NodeConfig::default())
        .id
        .clone();
    let b = graph
        .add_node(ComponentKind::Llm, NodeConfig::default())
        .id
        .clone();
    assert_ne!(a, b);
    assert!(graph.has_node(&a));
    assert!(graph.has_node(&b));
    assert_eq!(graph.nodes().len(), 2);
}

#[test]
fn test_remove_node_cascades_edges() {
    let mut graph = WorkflowGraph::new();
    let q = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let llm = graph
        .add_node(ComponentKind::Llm, NodeConfig::default())
        .id
        .clone();
    let out = graph
        .add_node(ComponentKind::Output, NodeConfig::default())
        .id
        .clone();
    graph.add_edge(&q, "query", &llm, "input").unwrap();
    graph.add_edge(&llm, "output", &out, "output").unwrap();
    graph.add_edge(&q, "query", &out, "output").unwrap();
    assert_eq!(graph.edges().len(), 3);

    graph.remove_node(&llm).unwrap();

    // Both edges touching the removed node are gone; the unrelated one stays.
    assert_eq!(graph.edges().len(), 1);
    assert!(
        graph
            .edges()
            .iter()
            .all(|e| e.source != llm && e.target != llm)
    );
}

#[test]
fn test_remove_missing_node_fails_not_found() {
    let mut graph = WorkflowGraph::new();
    let err = graph.remove_node("ghost").unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { id } if id == "ghost"));
}

#[test]
fn test_add_edge_requires_existing_endpoints() {
    let mut graph = WorkflowGraph::new();
    let q = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let err = graph.add_edge(&q, "query", "ghost", "input").unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { id } if id == "ghost"));

    let err = graph.add_edge("ghost", "query", &q, "input").unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { .. }));
    assert!(graph.edges().is_empty());
}

#[test]
fn test_add_edge_allows_incompatible_kinds() {
    // Kind/port compatibility is a validator concern, not a structural one.
    let mut graph = WorkflowGraph::new();
    let out = graph
        .add_node(ComponentKind::Output, NodeConfig::default())
        .id
        .clone();
    let q = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    assert!(graph.add_edge(&out, "output", &q, "query").is_ok());
}

#[test]
fn test_remove_edge() {
    let (mut graph, _, _) = minimal_graph();
    let edge_id = graph.edges()[0].id.clone();
    let removed = graph.remove_edge(&edge_id).unwrap();
    assert_eq!(removed.id, edge_id);
    assert!(graph.edges().is_empty());

    let err = graph.remove_edge(&edge_id).unwrap_err();
    assert!(matches!(err, GraphError::EdgeNotFound { .. }));
}

#[test]
fn test_update_node_config_shallow_merges() {
    let mut graph = WorkflowGraph::new();
    let llm = graph
        .add_node(
            ComponentKind::Llm,
            config(&[("provider", json!("openai")), ("temperature", json!(0.2))]),
        )
        .id
        .clone();

    graph
        .update_node_config(
            &llm,
            config(&[("api_key", json!("sk-123")), ("temperature", json!(0.7))]),
        )
        .unwrap();

    let node = graph.node(&llm).unwrap();
    // Untouched keys survive, patched keys overwrite, new keys land.
    assert_eq!(node.config.get("provider"), Some(&json!("openai")));
    assert_eq!(node.config.get("temperature"), Some(&json!(0.7)));
    assert_eq!(node.config.get("api_key"), Some(&json!("sk-123")));
}

#[test]
fn test_update_config_of_missing_node_fails() {
    let mut graph = WorkflowGraph::new();
    let err = graph
        .update_node_config("ghost", NodeConfig::default())
        .unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { .. }));
}

#[test]
fn test_definition_round_trip() {
    let graph = rag_graph();
    let definition = graph.to_definition();
    let rebuilt = WorkflowGraph::from_definition(definition.clone()).unwrap();
    assert_eq!(rebuilt.to_definition(), definition);
}

#[test]
fn test_from_definition_rejects_duplicate_node_ids() {
    let (graph, q, _) = minimal_graph();
    let mut definition = graph.to_definition();
    let mut dup = definition.nodes[1].clone();
    dup.id = q;
    definition.nodes.push(dup);

    let err = WorkflowGraph::from_definition(definition).unwrap_err();
    assert!(matches!(err, GraphError::InvalidDefinition(_)));
}

#[test]
fn test_from_definition_rejects_dangling_edges() {
    let (graph, _, _) = minimal_graph();
    let mut definition = graph.to_definition();
    definition.edges[0].target = "ghost".to_string();

    let err = WorkflowGraph::from_definition(definition).unwrap_err();
    assert!(matches!(err, GraphError::InvalidDefinition(msg) if msg.contains("ghost")));
}

#[test]
fn test_wire_shape_uses_editor_field_names() {
    let (graph, _, _) = minimal_graph();
    let json = serde_json::to_value(graph.to_definition()).unwrap();

    assert_eq!(json["nodes"][0]["type"], "user_query");
    assert!(json["edges"][0].get("sourceHandle").is_some());
    assert!(json["edges"][0].get("targetHandle").is_some());
    assert!(json["edges"][0].get("source_handle").is_none());
}
