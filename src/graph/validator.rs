//! Topology validation for workflow graphs.
//!
//! [`validate`] is a pure function from a graph to a pass/fail verdict
//! plus human-readable reasons. Rules are independent and every violation
//! is collected (never short-circuited), so an editor can present the
//! complete issue list in one pass. The validator performs no mutation
//! and has no side effects; it is cheap enough to run on every edit for
//! live feedback.
//!
//! The component catalog is open: graph-wide rules live here, per-kind
//! rules are contributed through the [`KindRegistry`] so new kinds extend
//! validation without touching this module.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::sync::Arc;

use super::model::WorkflowGraph;
use super::registry::{KindProfile, KindRegistry, TopologyRule};
use crate::types::ComponentKind;

/// Verdict of a validation pass.
///
/// Issues are data, never errors: an invalid graph is an ordinary state
/// an editor moves through, not an exceptional condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// True when no rule found a violation.
    pub ok: bool,
    /// Human-readable reasons the graph is not executable.
    pub issues: Vec<String>,
}

impl ValidationReport {
    /// A passing report with no issues.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            ok: true,
            issues: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            ok: issues.is_empty(),
            issues,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

/// Validates a graph against the default component catalog.
#[must_use]
pub fn validate(graph: &WorkflowGraph) -> ValidationReport {
    validate_with(graph, &KindRegistry::default())
}

/// Validates a graph against an explicit registry (for extended catalogs).
#[must_use]
pub fn validate_with(graph: &WorkflowGraph, registry: &KindRegistry) -> ValidationReport {
    // An empty graph is trivially valid; there is nothing to run yet.
    if graph.is_empty() {
        return ValidationReport::valid();
    }

    let mut issues = Vec::new();

    // Required kinds, sorted by display name so output is deterministic
    // regardless of registry iteration order.
    let mut missing: Vec<&str> = registry
        .profiles()
        .filter(|(kind, profile)| profile.required && !graph.contains_kind(kind))
        .map(|(kind, _)| kind.display_name())
        .collect();
    missing.sort_unstable();
    for name in missing {
        issues.push(format!(
            "Workflow must include {} {name} component",
            article(name)
        ));
    }

    if graph.edges().is_empty() {
        issues.push("Please connect the components together".to_string());
    }

    // Per-kind contributions, in first-appearance order over the nodes.
    let mut seen = FxHashSet::default();
    for node in graph.nodes() {
        if !seen.insert(node.kind.clone()) {
            continue;
        }
        if let Some(profile) = registry.profile(&node.kind) {
            if let Some(rule) = &profile.rule {
                issues.extend(rule.check(graph));
            }
        }
    }

    // Structural checks that only mean anything once edges exist.
    if !graph.edges().is_empty() {
        let mut connected = FxHashSet::default();
        for edge in graph.edges() {
            connected.insert(edge.source.as_str());
            connected.insert(edge.target.as_str());
        }
        let orphaned: Vec<&str> = graph
            .nodes()
            .iter()
            .filter(|n| !connected.contains(n.id.as_str()))
            .map(|n| n.id.as_str())
            .collect();
        if !orphaned.is_empty() {
            issues.push(format!("Orphaned components found: {}", orphaned.join(", ")));
        }

        if has_cycle(graph) {
            issues.push("Workflow contains circular dependencies".to_string());
        }
    }

    tracing::debug!(issue_count = issues.len(), "validated workflow graph");
    ValidationReport::from_issues(issues)
}

/// Cycle detection over node ids, iterative three-color DFS.
fn has_cycle(graph: &WorkflowGraph) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let mut adjacency: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for node in graph.nodes() {
        adjacency.entry(node.id.as_str()).or_default();
    }
    for edge in graph.edges() {
        // Endpoints always exist; the model enforces it.
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut colors: FxHashMap<&str, Color> =
        adjacency.keys().map(|id| (*id, Color::White)).collect();

    for node in graph.nodes() {
        let root = node.id.as_str();
        if colors[root] != Color::White {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        colors.insert(root, Color::Gray);
        while let Some((current, next_child)) = stack.pop() {
            if let Some(&child) = adjacency[current].get(next_child) {
                stack.push((current, next_child + 1));
                match colors[child] {
                    Color::Gray => return true,
                    Color::White => {
                        colors.insert(child, Color::Gray);
                        stack.push((child, 0));
                    }
                    Color::Black => {}
                }
            } else {
                colors.insert(current, Color::Black);
            }
        }
    }
    false
}

fn article(name: &str) -> &'static str {
    match name.chars().next() {
        Some('A' | 'E' | 'I' | 'O' | 'U') => "an",
        _ => "a",
    }
}

// ---------------------------------------------------------------------------
// Built-in rules
// ---------------------------------------------------------------------------

/// Every node of `kind` must be the source of at least one edge.
pub struct MustFanOut {
    pub kind: ComponentKind,
}

impl TopologyRule for MustFanOut {
    fn check(&self, graph: &WorkflowGraph) -> Vec<String> {
        let violated = graph
            .nodes_of_kind(&self.kind)
            .any(|n| !graph.is_edge_source(&n.id));
        if violated {
            vec![format!(
                "{} component must be connected to another component",
                self.kind.display_name()
            )]
        } else {
            Vec::new()
        }
    }
}

/// Every node of `kind` must be the target of at least one edge.
pub struct MustReceive {
    pub kind: ComponentKind,
}

impl TopologyRule for MustReceive {
    fn check(&self, graph: &WorkflowGraph) -> Vec<String> {
        let violated = graph
            .nodes_of_kind(&self.kind)
            .any(|n| !graph.is_edge_target(&n.id));
        if violated {
            vec![format!(
                "{} component must receive input from another component",
                self.kind.display_name()
            )]
        } else {
            Vec::new()
        }
    }
}

/// Nodes of `kind` must both receive input and emit output; each missing
/// direction is its own issue.
pub struct MustRelay {
    pub kind: ComponentKind,
}

impl TopologyRule for MustRelay {
    fn check(&self, graph: &WorkflowGraph) -> Vec<String> {
        let mut issues = Vec::new();
        let name = self.kind.display_name();
        if graph
            .nodes_of_kind(&self.kind)
            .any(|n| !graph.is_edge_target(&n.id))
        {
            issues.push(format!(
                "{name} component must receive input from another component"
            ));
        }
        if graph
            .nodes_of_kind(&self.kind)
            .any(|n| !graph.is_edge_source(&n.id))
        {
            issues.push(format!("{name} component must output to another component"));
        }
        issues
    }
}

/// Retrieval kinds must feed the LLM Engine when one is present, and feed
/// Output directly otherwise.
pub struct MustFeed {
    pub kind: ComponentKind,
}

impl TopologyRule for MustFeed {
    fn check(&self, graph: &WorkflowGraph) -> Vec<String> {
        if !graph.contains_kind(&self.kind) {
            return Vec::new();
        }
        let target_kind = if graph.contains_kind(&ComponentKind::Llm) {
            ComponentKind::Llm
        } else {
            ComponentKind::Output
        };
        let connected = graph.edges().iter().any(|e| {
            graph.node(&e.source).is_some_and(|n| n.kind == self.kind)
                && graph
                    .node(&e.target)
                    .is_some_and(|n| n.kind == target_kind)
        });
        if connected {
            Vec::new()
        } else {
            let expected = match target_kind {
                ComponentKind::Llm => "LLM Engine".to_string(),
                other => format!("{} component", other.display_name()),
            };
            vec![format!(
                "{} component should be connected to {expected}",
                self.kind.display_name()
            )]
        }
    }
}

/// Profiles for the five built-in component kinds, with the logical port
/// names their editor components expose.
pub(crate) fn builtin_profiles() -> Vec<(ComponentKind, KindProfile)> {
    vec![
        (
            ComponentKind::UserQuery,
            KindProfile::new()
                .with_outputs(["query"])
                .required()
                .with_rule(Arc::new(MustFanOut {
                    kind: ComponentKind::UserQuery,
                })),
        ),
        (
            ComponentKind::KnowledgeBase,
            KindProfile::new()
                .with_inputs(["query"])
                .with_outputs(["context"])
                .with_rule(Arc::new(MustFeed {
                    kind: ComponentKind::KnowledgeBase,
                })),
        ),
        (
            ComponentKind::WebSearch,
            KindProfile::new()
                .with_inputs(["query"])
                .with_outputs(["results"])
                .with_rule(Arc::new(MustFeed {
                    kind: ComponentKind::WebSearch,
                })),
        ),
        (
            ComponentKind::Llm,
            KindProfile::new()
                .with_inputs(["input"])
                .with_outputs(["output"])
                .with_rule(Arc::new(MustRelay {
                    kind: ComponentKind::Llm,
                })),
        ),
        (
            ComponentKind::Output,
            KindProfile::new()
                .with_inputs(["output"])
                .required()
                .with_rule(Arc::new(MustReceive {
                    kind: ComponentKind::Output,
                })),
        ),
    ]
}
