//! Extraction of credentials and per-node configuration into an
//! execution request.
//!
//! Applied once per submission by scanning all nodes in graph insertion
//! order. Only the fields named here are interpreted; everything else in
//! a node's config is forwarded opaquely, keyed by node id.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::gateway::{ExecuteRequest, HistoryMessage};
use crate::graph::{ComponentNode, WorkflowGraph};
use crate::types::{ComponentKind, SessionId, WorkflowId};

/// Collects credential fields from node configs.
///
/// - a KnowledgeBase node's non-empty `embedding_api_key` lands under
///   `embedding`;
/// - an LLM node's non-empty `api_key` lands under the slot its
///   `provider` selects (`gemini`, `grok`, anything else `openai`);
/// - any node's non-empty `serp_api_key` lands under `serp`.
///
/// Later nodes win when multiple nodes populate the same slot.
#[must_use]
pub fn collect_api_keys(graph: &WorkflowGraph) -> FxHashMap<String, String> {
    let mut keys = FxHashMap::default();
    for node in graph.nodes() {
        match node.kind {
            ComponentKind::KnowledgeBase => {
                if let Some(key) = non_empty_field(node, "embedding_api_key") {
                    keys.insert("embedding".to_string(), key);
                }
            }
            ComponentKind::Llm => {
                if let Some(key) = non_empty_field(node, "api_key") {
                    let provider = node
                        .config
                        .get("provider")
                        .and_then(Value::as_str)
                        .unwrap_or("openai");
                    let slot = match provider {
                        "gemini" => "gemini",
                        "grok" => "grok",
                        _ => "openai",
                    };
                    keys.insert(slot.to_string(), key);
                }
            }
            _ => {}
        }
        if let Some(key) = non_empty_field(node, "serp_api_key") {
            keys.insert("serp".to_string(), key);
        }
    }
    keys
}

/// Every node's full config, keyed by node id, forwarded for backend use.
#[must_use]
pub fn collect_node_configs(graph: &WorkflowGraph) -> FxHashMap<String, Value> {
    graph
        .nodes()
        .iter()
        .map(|node| (node.id.clone(), Value::Object(node.config.clone())))
        .collect()
}

/// Assembles the reliable call's payload for one turn.
#[must_use]
pub fn build_request(
    workflow_id: WorkflowId,
    graph: &WorkflowGraph,
    query: &str,
    session_id: SessionId,
    chat_history: Vec<HistoryMessage>,
) -> ExecuteRequest {
    ExecuteRequest {
        workflow_id,
        query: query.to_string(),
        session_id,
        api_keys: collect_api_keys(graph),
        node_configs: collect_node_configs(graph),
        chat_history,
    }
}

fn non_empty_field(node: &ComponentNode, field: &str) -> Option<String> {
    node.config
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
