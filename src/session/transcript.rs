//! Ordered conversation log owned by the session controller.
//!
//! The transcript is the single shared resource both execution channels
//! write into, and the controller is its only mutator; presentation
//! layers read it. Ordering is insertion order. The last assistant
//! message of a live turn may be mutated in place (fragments append,
//! authoritative text replaces) until the turn completes.

use crate::gateway::{ChatRecord, HistoryMessage};
use crate::message::Message;

/// Insertion-ordered conversation log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transcript from persisted history records.
    ///
    /// Records arrive in the store's newest-first order and are reversed
    /// to chronological order, then each record expands into a
    /// `user`/`assistant` pair carrying the record's original timestamp.
    #[must_use]
    pub fn seed_from_history(records: Vec<ChatRecord>) -> Self {
        let mut messages = Vec::with_capacity(records.len() * 2);
        for record in records.into_iter().rev() {
            messages.push(Message::user(&record.user_query).at(record.created_at));
            messages.push(Message::assistant(&record.response).at(record.created_at));
        }
        Self { messages }
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Renders the transcript as role/content pairs for an execution
    /// request.
    #[must_use]
    pub fn as_history(&self) -> Vec<HistoryMessage> {
        self.messages
            .iter()
            .map(|m| HistoryMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Appends a streamed fragment to the last message's content.
    pub(crate) fn append_to_last(&mut self, fragment: &str) {
        if let Some(last) = self.messages.last_mut() {
            last.content.push_str(fragment);
        }
    }

    /// Replaces the last message's content with authoritative text.
    pub(crate) fn replace_last(&mut self, content: &str) {
        if let Some(last) = self.messages.last_mut() {
            last.content = content.to_string();
        }
    }

    /// True when the last message is an assistant message with exactly
    /// this content. Used to suppress duplicate error reports.
    #[must_use]
    pub(crate) fn last_assistant_matches(&self, content: &str) -> bool {
        self.messages
            .last()
            .is_some_and(|m| m.has_role(Message::ASSISTANT) && m.content == content)
    }
}
