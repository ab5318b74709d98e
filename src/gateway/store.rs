//! Persistence gateway for workflow definitions and chat history.
//!
//! The core consumes this interface; it does not own a database. The
//! bundled [`InMemoryWorkflowStore`] is a volatile implementation for
//! tests, demos, and development, mirroring the gateway's observable
//! contract: structural validation of non-empty definitions on write,
//! newest-first chat history, and cascade deletion of a workflow's log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

use crate::graph::{WorkflowDefinition, WorkflowGraph, validate};
use crate::types::WorkflowId;
use crate::utils::IdGenerator;

/// Payload for creating or updating a workflow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub definition: WorkflowDefinition,
}

/// A persisted workflow, as returned by [`WorkflowStore::get_workflow`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredWorkflow {
    pub id: WorkflowId,
    pub name: String,
    pub description: String,
    pub definition: WorkflowDefinition,
}

/// Listing entry for a persisted workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: WorkflowId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// One persisted query/response exchange.
///
/// [`WorkflowStore::chat_history`] returns records newest-first (storage
/// order); [`crate::session::Transcript::seed_from_history`] reverses
/// them to chronological order when a conversation opens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub user_query: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Failures from the persistence gateway.
///
/// These surface to the caller (e.g. as an editor alert) and never
/// corrupt local state: a failed save leaves in-progress edits intact.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("workflow not found: {id}")]
    #[diagnostic(code(flowmind::store::not_found))]
    NotFound { id: String },

    #[error("conflicting workflow: {0}")]
    #[diagnostic(code(flowmind::store::conflict))]
    Conflict(String),

    #[error("invalid workflow: {0}")]
    #[diagnostic(
        code(flowmind::store::invalid),
        help("Fix the reported topology issues before saving.")
    )]
    Invalid(String),

    #[error("storage backend failure: {0}")]
    #[diagnostic(code(flowmind::store::backend))]
    Backend(String),
}

/// Create/read/update/delete for workflow definitions plus history reads.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn create_workflow(&self, draft: WorkflowDraft) -> Result<WorkflowId, StoreError>;

    async fn get_workflow(&self, id: &WorkflowId) -> Result<StoredWorkflow, StoreError>;

    async fn update_workflow(&self, id: &WorkflowId, draft: WorkflowDraft)
    -> Result<(), StoreError>;

    async fn delete_workflow(&self, id: &WorkflowId) -> Result<(), StoreError>;

    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>, StoreError>;

    /// Chat history for a workflow, newest-first.
    async fn chat_history(&self, id: &WorkflowId) -> Result<Vec<ChatRecord>, StoreError>;
}

struct StoredEntry {
    workflow: StoredWorkflow,
    created_at: DateTime<Utc>,
    /// Chronological; served newest-first.
    chat: Vec<ChatRecord>,
}

#[derive(Default)]
struct StoreInner {
    entries: FxHashMap<String, StoredEntry>,
    /// Creation order, oldest first.
    order: Vec<String>,
}

/// Volatile, mutex-guarded workflow store.
///
/// Non-empty definitions are structurally validated on create and update
/// (an empty definition saves unvalidated, so a user can name a workflow
/// before assembling it). Deleting a workflow deletes its chat log.
#[derive(Default)]
pub struct InMemoryWorkflowStore {
    inner: Mutex<StoreInner>,
    ids: IdGenerator,
}

impl InMemoryWorkflowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an exchange to a workflow's chat log. Exposed for seeding
    /// history in tests and demos; a real backend records this during
    /// execution.
    pub fn append_chat(&self, id: &WorkflowId, record: ChatRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let entry = inner
            .entries
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound {
                id: id.to_string(),
            })?;
        entry.chat.push(record);
        Ok(())
    }

    fn check_draft(draft: &WorkflowDraft) -> Result<(), StoreError> {
        if draft.definition.nodes.is_empty() {
            return Ok(());
        }
        let graph = WorkflowGraph::from_definition(draft.definition.clone())
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        let report = validate(&graph);
        if report.ok {
            Ok(())
        } else {
            Err(StoreError::Invalid(format!(
                "workflow validation failed: {}",
                report.issues.join("; ")
            )))
        }
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn create_workflow(&self, draft: WorkflowDraft) -> Result<WorkflowId, StoreError> {
        Self::check_draft(&draft)?;
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner
            .entries
            .values()
            .any(|e| e.workflow.name == draft.name)
        {
            return Err(StoreError::Conflict(format!(
                "a workflow named {:?} already exists",
                draft.name
            )));
        }
        let id = WorkflowId::new(self.ids.generate_workflow_id());
        tracing::info!(workflow = %id, name = %draft.name, "created workflow");
        inner.order.push(id.as_str().to_string());
        inner.entries.insert(
            id.as_str().to_string(),
            StoredEntry {
                workflow: StoredWorkflow {
                    id: id.clone(),
                    name: draft.name,
                    description: draft.description,
                    definition: draft.definition,
                },
                created_at: Utc::now(),
                chat: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn get_workflow(&self, id: &WorkflowId) -> Result<StoredWorkflow, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .entries
            .get(id.as_str())
            .map(|e| e.workflow.clone())
            .ok_or_else(|| StoreError::NotFound {
                id: id.to_string(),
            })
    }

    async fn update_workflow(
        &self,
        id: &WorkflowId,
        draft: WorkflowDraft,
    ) -> Result<(), StoreError> {
        Self::check_draft(&draft)?;
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let entry = inner
            .entries
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound {
                id: id.to_string(),
            })?;
        entry.workflow.name = draft.name;
        entry.workflow.description = draft.description;
        entry.workflow.definition = draft.definition;
        Ok(())
    }

    async fn delete_workflow(&self, id: &WorkflowId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.entries.remove(id.as_str()).is_none() {
            return Err(StoreError::NotFound {
                id: id.to_string(),
            });
        }
        inner.order.retain(|existing| existing != id.as_str());
        tracing::info!(workflow = %id, "deleted workflow and its chat log");
        Ok(())
    }

    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.entries.get(id))
            .map(|e| WorkflowSummary {
                id: e.workflow.id.clone(),
                name: e.workflow.name.clone(),
                description: e.workflow.description.clone(),
                created_at: e.created_at,
            })
            .collect())
    }

    async fn chat_history(&self, id: &WorkflowId) -> Result<Vec<ChatRecord>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let entry = inner
            .entries
            .get(id.as_str())
            .ok_or_else(|| StoreError::NotFound {
                id: id.to_string(),
            })?;
        Ok(entry.chat.iter().rev().cloned().collect())
    }
}
