//! Core identifier types for the flowmind workflow system.
//!
//! This module defines the fundamental types used throughout flowmind for
//! identifying workflow components and correlating execution sessions.
//!
//! # Key Types
//!
//! - [`ComponentKind`]: identifies the type of a component in a workflow graph
//! - [`WorkflowId`]: opaque handle for a persisted workflow definition
//! - [`SessionId`]: correlates one turn's streaming channel and reliable call
//!
//! # Examples
//!
//! ```rust
//! use flowmind::types::{ComponentKind, SessionId};
//!
//! let kind = ComponentKind::KnowledgeBase;
//! assert_eq!(kind.encode(), "knowledgebase");
//! assert_eq!(kind.display_name(), "Knowledge Base");
//!
//! // Session ids are unique enough to avoid same-millisecond collisions
//! // within one process.
//! let a = SessionId::generate();
//! let b = SessionId::generate();
//! assert_ne!(a, b);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::id_generator::IdGenerator;

/// Identifies the type of a component within a workflow graph.
///
/// `ComponentKind` is a closed enumeration of the built-in processing
/// stages, with a `Custom` variant as the extensibility seam for kinds
/// registered at runtime (see [`crate::graph::KindRegistry`]). The
/// validator never matches on raw strings; kinds either hit a built-in
/// variant or round-trip through `Custom`.
///
/// # Persistence
///
/// Kinds serialize to the wire strings of the editor's persisted format
/// (`"user_query"`, `"knowledgebase"`, ...) via [`encode`](Self::encode)
/// and [`decode`](Self::decode); serde uses the same representation.
///
/// # Examples
///
/// ```rust
/// use flowmind::types::ComponentKind;
///
/// assert_eq!(ComponentKind::decode("llm"), ComponentKind::Llm);
/// assert_eq!(ComponentKind::Llm.encode(), "llm");
///
/// // Unknown strings become Custom, keeping persisted graphs forward-compatible.
/// assert_eq!(
///     ComponentKind::decode("reranker"),
///     ComponentKind::Custom("reranker".to_string())
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ComponentKind {
    /// Entry stage carrying the user's query into the graph.
    UserQuery,
    /// Retrieval stage answering a query with stored context.
    KnowledgeBase,
    /// Retrieval stage answering a query with live web results.
    WebSearch,
    /// Language-model stage consuming context and producing a response.
    Llm,
    /// Terminal stage presenting the final response.
    Output,
    /// Custom component kind identified by a user-defined string.
    ///
    /// The string should be unique within the workflow's registry; it is
    /// preserved verbatim through encode/decode.
    Custom(String),
}

impl ComponentKind {
    /// Encode a kind into its persisted string form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            ComponentKind::UserQuery => "user_query".to_string(),
            ComponentKind::KnowledgeBase => "knowledgebase".to_string(),
            ComponentKind::WebSearch => "websearch".to_string(),
            ComponentKind::Llm => "llm".to_string(),
            ComponentKind::Output => "output".to_string(),
            ComponentKind::Custom(s) => s.clone(),
        }
    }

    /// Decode a persisted string form back into a kind.
    ///
    /// Unrecognized strings fall back to `Custom(s)` for forward
    /// compatibility with kinds registered after a graph was saved.
    pub fn decode(s: &str) -> Self {
        match s {
            "user_query" => ComponentKind::UserQuery,
            "knowledgebase" => ComponentKind::KnowledgeBase,
            "websearch" => ComponentKind::WebSearch,
            "llm" => ComponentKind::Llm,
            "output" => ComponentKind::Output,
            other => ComponentKind::Custom(other.to_string()),
        }
    }

    /// Human-readable name used in validation issue text.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            ComponentKind::UserQuery => "User Query",
            ComponentKind::KnowledgeBase => "Knowledge Base",
            ComponentKind::WebSearch => "Web Search",
            ComponentKind::Llm => "LLM Engine",
            ComponentKind::Output => "Output",
            ComponentKind::Custom(s) => s,
        }
    }

    /// Returns `true` if this is a [`UserQuery`](Self::UserQuery) component.
    #[must_use]
    pub fn is_user_query(&self) -> bool {
        matches!(self, Self::UserQuery)
    }

    /// Returns `true` if this is an [`Output`](Self::Output) component.
    #[must_use]
    pub fn is_output(&self) -> bool {
        matches!(self, Self::Output)
    }

    /// Returns `true` if this is a custom component kind.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

// Developer Experience: allow using string literals where a ComponentKind
// is expected.
impl From<&str> for ComponentKind {
    fn from(s: &str) -> Self {
        ComponentKind::decode(s)
    }
}

impl From<String> for ComponentKind {
    fn from(s: String) -> Self {
        ComponentKind::decode(&s)
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.encode()
    }
}

/// Opaque handle identifying a persisted workflow definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorkflowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Correlates one turn's streaming channel with its reliable call.
///
/// A session id only needs to be unique with overwhelming probability
/// within one process: every frame arriving on the streaming channel is
/// tagged with its owning session id, and the session controller discards
/// frames whose tag does not match the live turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh session id (`{unix_millis}_{random suffix}`).
    #[must_use]
    pub fn generate() -> Self {
        Self(IdGenerator::new().generate_session_id())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
