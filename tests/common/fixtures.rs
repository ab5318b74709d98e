use flowmind::graph::{NodeConfig, WorkflowGraph};
use flowmind::types::ComponentKind;
use serde_json::Value;

/// Builds a node config from literal pairs.
pub fn config(pairs: &[(&str, Value)]) -> NodeConfig {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// The smallest valid pipeline: UserQuery -> Output.
/// Returns the graph plus both node ids.
pub fn minimal_graph() -> (WorkflowGraph, String, String) {
    let mut graph = WorkflowGraph::new();
    let query = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let output = graph
        .add_node(ComponentKind::Output, NodeConfig::default())
        .id
        .clone();
    graph
        .add_edge(&query, "query", &output, "output")
        .expect("both endpoints exist");
    (graph, query, output)
}

/// A retrieval-augmented pipeline:
/// UserQuery -> Llm, KnowledgeBase -> Llm, Llm -> Output.
pub fn rag_graph() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new();
    let query = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let kb = graph
        .add_node(
            ComponentKind::KnowledgeBase,
            config(&[("embedding_api_key", "emb-key".into())]),
        )
        .id
        .clone();
    let llm = graph
        .add_node(
            ComponentKind::Llm,
            config(&[
                ("api_key", "llm-key".into()),
                ("provider", "openai".into()),
            ]),
        )
        .id
        .clone();
    let output = graph
        .add_node(ComponentKind::Output, NodeConfig::default())
        .id
        .clone();
    graph.add_edge(&query, "query", &llm, "input").unwrap();
    graph.add_edge(&kb, "context", &llm, "input").unwrap();
    graph.add_edge(&llm, "output", &output, "output").unwrap();
    graph
}
