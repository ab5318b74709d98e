use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message in a conversation transcript, containing a role, text
/// content, and an optional timestamp.
///
/// Messages are the primary data structure for the conversation log a
/// session controller maintains. Each message has a role (`"user"` or
/// `"assistant"` for transcript entries) and text content; messages seeded
/// from persisted chat history additionally carry the instant the original
/// exchange was recorded.
///
/// Assistant messages are mutated in place while a turn is streaming
/// (token fragments append, authoritative text replaces) and are stable
/// once the turn completes.
///
/// # Examples
///
/// ```
/// use flowmind::message::Message;
///
/// let user_msg = Message::user("What is in the knowledge base?");
/// let assistant_msg = Message::assistant("Three documents about lichen.");
///
/// assert!(user_msg.has_role(Message::USER));
/// assert!(user_msg.timestamp.is_none());
/// ```
///
/// # Serialization
///
/// Messages implement `Serialize` and `Deserialize`; the timestamp is
/// omitted from the wire form when absent:
/// ```
/// use flowmind::message::Message;
///
/// let msg = Message::user("test");
/// let json = serde_json::to_string(&msg).unwrap();
/// assert!(!json.contains("timestamp"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender (`"user"` or `"assistant"`).
    ///
    /// Use the constants on [`Message`] for standardized values.
    pub role: String,
    /// The text content of the message.
    pub content: String,
    /// When the exchange was originally recorded, for history-seeded
    /// entries. Fresh messages appended during a live turn carry `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// User input message role.
    pub const USER: &'static str = "user";
    /// AI assistant response message role.
    pub const ASSISTANT: &'static str = "assistant";

    /// Creates a new message with the specified role and content.
    #[must_use]
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: None,
        }
    }

    /// Creates a user message with the specified content.
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self::new(Self::USER, content)
    }

    /// Creates an assistant message with the specified content.
    #[must_use]
    pub fn assistant(content: &str) -> Self {
        Self::new(Self::ASSISTANT, content)
    }

    /// Attaches a timestamp, for messages expanded from persisted history.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Returns true if this message has the specified role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Verifies that a Message can be constructed and its fields are set correctly.
    fn test_message_construction() {
        let msg = Message::new("user", "hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");
        assert!(msg.timestamp.is_none());
    }

    #[test]
    /// Tests convenience constructors for the two transcript roles.
    fn test_convenience_constructors() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, Message::USER);
        assert_eq!(user_msg.content, "Hello");

        let assistant_msg = Message::assistant("Hi there!");
        assert_eq!(assistant_msg.role, Message::ASSISTANT);
        assert_eq!(assistant_msg.content, "Hi there!");
    }

    #[test]
    /// Tests role checking methods.
    fn test_role_checking() {
        let user_msg = Message::user("Hello");
        assert!(user_msg.has_role(Message::USER));
        assert!(!user_msg.has_role(Message::ASSISTANT));

        let assistant_msg = Message::assistant("Hi");
        assert!(assistant_msg.has_role(Message::ASSISTANT));
        assert!(!assistant_msg.has_role(Message::USER));
    }

    #[test]
    /// Timestamps attach via the builder and survive a serde round-trip.
    fn test_timestamped_serialization() {
        let when = chrono::Utc::now();
        let original = Message::assistant("archived reply").at(when);
        let json = serde_json::to_string(&original).expect("serialization failed");
        let deserialized: Message = serde_json::from_str(&json).expect("deserialization failed");

        assert_eq!(original, deserialized);
        assert_eq!(deserialized.timestamp, Some(when));
    }

    #[test]
    /// Untimestamped messages omit the field from their wire form.
    fn test_untimestamped_wire_form() {
        let msg = Message::user("fresh");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("timestamp"));
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, parsed);
    }
}
