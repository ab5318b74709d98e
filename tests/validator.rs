mod common;

use common::*;
use flowmind::graph::{
    KindProfile, KindRegistry, NodeConfig, TopologyRule, WorkflowGraph, validate, validate_with,
};
use flowmind::types::ComponentKind;
use rustc_hash::FxHashSet;
use std::sync::Arc;

#[test]
fn test_empty_graph_is_valid() {
    let report = validate(&WorkflowGraph::new());
    assert!(report.ok);
    assert!(report.issues.is_empty());
}

#[test]
fn test_minimal_pair_is_valid() {
    let (graph, _, _) = minimal_graph();
    let report = validate(&graph);
    assert!(report.ok, "unexpected issues: {:?}", report.issues);
}

#[test]
fn test_missing_required_kinds_each_reported() {
    let mut graph = WorkflowGraph::new();
    graph.add_node(ComponentKind::Llm, NodeConfig::default());

    let report = validate(&graph);
    assert!(!report.ok);
    assert!(
        report
            .issues
            .contains(&"Workflow must include a User Query component".to_string())
    );
    assert!(
        report
            .issues
            .contains(&"Workflow must include an Output component".to_string())
    );
}

#[test]
fn test_unconnected_pair_collects_all_rules_without_duplicates() {
    let mut graph = WorkflowGraph::new();
    graph.add_node(ComponentKind::UserQuery, NodeConfig::default());
    graph.add_node(ComponentKind::Output, NodeConfig::default());

    let report = validate(&graph);
    assert!(!report.ok);
    assert!(
        report
            .issues
            .contains(&"Please connect the components together".to_string())
    );
    // Per-kind rules still run alongside the connect rule.
    assert!(
        report
            .issues
            .contains(&"User Query component must be connected to another component".to_string())
    );
    assert!(
        report
            .issues
            .contains(&"Output component must receive input from another component".to_string())
    );
    // No rule reports twice.
    let unique: FxHashSet<&String> = report.issues.iter().collect();
    assert_eq!(unique.len(), report.issues.len());
}

#[test]
fn test_llm_missing_input_is_its_own_issue() {
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
    // The LLM emits but never receives.
    graph.add_edge(&llm, "output", &out, "output").unwrap();
    graph.add_edge(&q, "query", &out, "output").unwrap();

    let report = validate(&graph);
    assert!(!report.ok);
    assert!(
        report
            .issues
            .contains(&"LLM Engine component must receive input from another component".to_string())
    );
    assert!(
        !report
            .issues
            .contains(&"LLM Engine component must output to another component".to_string())
    );
}

#[test]
fn test_llm_missing_output_is_its_own_issue() {
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
    graph.add_edge(&q, "query", &out, "output").unwrap();

    let report = validate(&graph);
    assert!(
        report
            .issues
            .contains(&"LLM Engine component must output to another component".to_string())
    );
}

#[test]
fn test_knowledge_base_must_feed_llm_when_present() {
    let mut graph = WorkflowGraph::new();
    let q = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let kb = graph
        .add_node(ComponentKind::KnowledgeBase, NodeConfig::default())
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
    // KB feeds Output directly instead of the LLM.
    graph.add_edge(&kb, "context", &out, "output").unwrap();

    let report = validate(&graph);
    assert!(
        report
            .issues
            .contains(&"Knowledge Base component should be connected to LLM Engine".to_string())
    );
}

#[test]
fn test_knowledge_base_feeds_output_when_no_llm() {
    let mut graph = WorkflowGraph::new();
    let q = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let kb = graph
        .add_node(ComponentKind::KnowledgeBase, NodeConfig::default())
        .id
        .clone();
    let out = graph
        .add_node(ComponentKind::Output, NodeConfig::default())
        .id
        .clone();
    graph.add_edge(&q, "query", &kb, "query").unwrap();
    graph.add_edge(&kb, "context", &out, "output").unwrap();
    assert!(validate(&graph).ok);

    // Reverse the retrieval edge and the rule trips.
    let mut broken = WorkflowGraph::new();
    let q = broken
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let kb = broken
        .add_node(ComponentKind::KnowledgeBase, NodeConfig::default())
        .id
        .clone();
    let out = broken
        .add_node(ComponentKind::Output, NodeConfig::default())
        .id
        .clone();
    broken.add_edge(&q, "query", &kb, "query").unwrap();
    broken.add_edge(&q, "query", &out, "output").unwrap();

    let report = validate(&broken);
    assert!(
        report
            .issues
            .contains(&"Knowledge Base component should be connected to Output component".to_string())
    );
}

#[test]
fn test_web_search_follows_the_same_feed_rule() {
    let mut graph = WorkflowGraph::new();
    let q = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let ws = graph
        .add_node(ComponentKind::WebSearch, NodeConfig::default())
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
    graph.add_edge(&q, "query", &ws, "query").unwrap();

    let report = validate(&graph);
    assert!(
        report
            .issues
            .contains(&"Web Search component should be connected to LLM Engine".to_string())
    );
}

#[test]
fn test_orphaned_components_reported() {
    let (mut graph, _, _) = minimal_graph();
    let stray = graph
        .add_node(ComponentKind::KnowledgeBase, NodeConfig::default())
        .id
        .clone();

    let report = validate(&graph);
    assert!(
        report
            .issues
            .iter()
            .any(|i| i.starts_with("Orphaned components found") && i.contains(&stray))
    );
}

#[test]
fn test_cycles_reported() {
    let mut graph = WorkflowGraph::new();
    let q = graph
        .add_node(ComponentKind::UserQuery, NodeConfig::default())
        .id
        .clone();
    let kb = graph
        .add_node(ComponentKind::KnowledgeBase, NodeConfig::default())
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
    graph.add_edge(&kb, "context", &llm, "input").unwrap();
    graph.add_edge(&llm, "output", &out, "output").unwrap();
    // Llm feeding its own retriever closes a loop.
    graph.add_edge(&llm, "output", &kb, "query").unwrap();

    let report = validate(&graph);
    assert!(
        report
            .issues
            .contains(&"Workflow contains circular dependencies".to_string())
    );
}

#[test]
fn test_validation_never_mutates_the_graph() {
    let (graph, _, _) = minimal_graph();
    let before = graph.to_definition();
    let _ = validate(&graph);
    let _ = validate(&graph);
    assert_eq!(graph.to_definition(), before);
}

/// Custom kinds contribute their own rules through the registry.
struct MustHaveInput(ComponentKind);

impl TopologyRule for MustHaveInput {
    fn check(&self, graph: &WorkflowGraph) -> Vec<String> {
        if graph
            .nodes_of_kind(&self.0)
            .any(|n| !graph.is_edge_target(&n.id))
        {
            vec![format!(
                "{} component must receive candidates to rank",
                self.0.display_name()
            )]
        } else {
            Vec::new()
        }
    }
}

#[test]
fn test_registry_extension_contributes_issues() {
    let reranker = ComponentKind::Custom("reranker".to_string());
    let registry = KindRegistry::default().with_profile(
        reranker.clone(),
        KindProfile::new()
            .with_inputs(["candidates"])
            .with_outputs(["ranked"])
            .with_rule(Arc::new(MustHaveInput(reranker.clone()))),
    );

    let (mut graph, q, _) = minimal_graph();
    let ranker = graph.add_node(reranker, NodeConfig::default()).id.clone();
    graph.add_edge(&ranker, "ranked", &q, "query").unwrap();

    let report = validate_with(&graph, &registry);
    assert!(
        report
            .issues
            .contains(&"reranker component must receive candidates to rank".to_string())
    );
}
