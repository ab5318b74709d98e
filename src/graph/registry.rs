//! Registry mapping component kinds to their port layout and validation
//! contribution.
//!
//! The validator never hard-codes the component catalog: every kind the
//! system understands is described by a [`KindProfile`] in a
//! [`KindRegistry`]. The default registry wires the five built-in kinds;
//! new kinds plug in through [`register`](KindRegistry::register) without
//! touching validator code.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::model::WorkflowGraph;
use crate::types::ComponentKind;

/// A kind's validation contribution, run when the kind is present in a
/// non-empty graph.
///
/// Implementations inspect the whole graph and return zero or more
/// human-readable issues. Rules must be pure: no mutation, no side
/// effects, so validation is safe to run on every edit.
pub trait TopologyRule: Send + Sync {
    fn check(&self, graph: &WorkflowGraph) -> Vec<String>;
}

/// Describes one component kind: its logical ports and how it constrains
/// graph topology.
#[derive(Clone, Default)]
pub struct KindProfile {
    /// Named input ports, e.g. `query` on a Knowledge Base.
    pub input_ports: Vec<String>,
    /// Named output ports, e.g. `context` on a Knowledge Base.
    pub output_ports: Vec<String>,
    /// Whether every non-empty graph must contain this kind.
    pub required: bool,
    /// Topology constraint contributed when the kind is present.
    pub rule: Option<Arc<dyn TopologyRule>>,
}

impl KindProfile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_inputs<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_ports = ports.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_outputs<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_ports = ports.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Arc<dyn TopologyRule>) -> Self {
        self.rule = Some(rule);
        self
    }
}

impl std::fmt::Debug for KindProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindProfile")
            .field("input_ports", &self.input_ports)
            .field("output_ports", &self.output_ports)
            .field("required", &self.required)
            .field("rule", &self.rule.as_ref().map(|_| "<rule>"))
            .finish()
    }
}

/// Registry of component kinds known to the validator.
///
/// # Examples
///
/// Extending the catalog with a custom kind:
///
/// ```
/// use flowmind::graph::{KindProfile, KindRegistry};
/// use flowmind::types::ComponentKind;
///
/// let registry = KindRegistry::default().with_profile(
///     ComponentKind::Custom("reranker".into()),
///     KindProfile::new()
///         .with_inputs(["candidates"])
///         .with_outputs(["ranked"]),
/// );
/// assert!(registry.profile(&ComponentKind::Custom("reranker".into())).is_some());
/// ```
#[derive(Clone, Debug)]
pub struct KindRegistry {
    profiles: FxHashMap<ComponentKind, KindProfile>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        for (kind, profile) in super::validator::builtin_profiles() {
            registry.register(kind, profile);
        }
        registry
    }
}

impl KindRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: FxHashMap::default(),
        }
    }

    /// Registers a profile for a kind, replacing any existing one.
    ///
    /// Returns a mutable reference to self for method chaining.
    pub fn register(&mut self, kind: ComponentKind, profile: KindProfile) -> &mut Self {
        self.profiles.insert(kind, profile);
        self
    }

    /// Builder-style method for registering a profile.
    #[must_use]
    pub fn with_profile(mut self, kind: ComponentKind, profile: KindProfile) -> Self {
        self.register(kind, profile);
        self
    }

    /// Looks up the profile for a kind.
    #[must_use]
    pub fn profile(&self, kind: &ComponentKind) -> Option<&KindProfile> {
        self.profiles.get(kind)
    }

    /// All registered kinds and profiles, in unspecified order.
    pub fn profiles(&self) -> impl Iterator<Item = (&ComponentKind, &KindProfile)> {
        self.profiles.iter()
    }
}
