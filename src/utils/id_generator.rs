//! Identifier minting for nodes, connections, workflows, and sessions.

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use uuid::Uuid;

use crate::types::ComponentKind;

/// Length of the random suffix appended to session ids.
const SESSION_SUFFIX_LEN: usize = 6;

/// Mints the identifiers used across the workflow system.
///
/// Node and connection ids are kind- or role-prefixed short uuids, unique
/// within a process regardless of how quickly components are added.
/// Session ids are the current unix-millisecond timestamp plus a short
/// random suffix: unique with overwhelming probability within one process,
/// which is all the session-tagging discipline requires.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator;

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Id for a freshly added graph node, e.g. `llm_1f3a9c2e`.
    #[must_use]
    pub fn generate_node_id(&self, kind: &ComponentKind) -> String {
        format!("{}_{}", kind.encode(), short_uuid())
    }

    /// Id for a freshly added connection, e.g. `edge_7b20d54f`.
    #[must_use]
    pub fn generate_connection_id(&self) -> String {
        format!("edge_{}", short_uuid())
    }

    /// Id for a workflow created through the in-memory store.
    #[must_use]
    pub fn generate_workflow_id(&self) -> String {
        format!("wf_{}", short_uuid())
    }

    /// Id correlating one turn's streaming channel and reliable call,
    /// e.g. `1731436800123_k3xq9a`.
    #[must_use]
    pub fn generate_session_id(&self) -> String {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(SESSION_SUFFIX_LEN)
            .map(char::from)
            .collect();
        format!("{}_{}", Utc::now().timestamp_millis(), suffix.to_lowercase())
    }
}

fn short_uuid() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_carry_kind_prefix_and_differ() {
        let generator = IdGenerator::new();
        let a = generator.generate_node_id(&ComponentKind::Llm);
        let b = generator.generate_node_id(&ComponentKind::Llm);
        assert!(a.starts_with("llm_"));
        assert_ne!(a, b);
    }

    #[test]
    fn session_ids_differ_within_the_same_millisecond() {
        let generator = IdGenerator::new();
        let ids: Vec<String> = (0..32).map(|_| generator.generate_session_id()).collect();
        for (i, id) in ids.iter().enumerate() {
            assert!(id.contains('_'));
            for other in &ids[i + 1..] {
                assert_ne!(id, other);
            }
        }
    }
}
