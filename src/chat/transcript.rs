//! Ordered chat transcript

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Opening message of every conversation
pub const GREETING: &str = "Hi there. I'm your PeaceNet AI companion. I'm here to listen, offer \
support, and help you navigate difficult digital situations. I'm not a therapist, but I can \
provide resources and strategies. How are you feeling today?";

/// Id reserved for the greeting
pub const GREETING_ID: MessageId = MessageId(1);

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person seeking support
    User,
    /// The AI companion
    Assistant,
}

/// Message identifier, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

/// Append-only list of messages, reset only by `clear`
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// A transcript holding only the greeting
    pub fn new() -> Self {
        Self { messages: vec![greeting()], next_id: GREETING_ID.0 + 1 }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the greeting is never removed
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message and return it
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &Message {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message { id, role, content: content.into(), created_at: now() });
        &self.messages[self.messages.len() - 1]
    }

    /// Back to the greeting alone; ids keep counting up
    pub fn clear(&mut self) {
        self.messages.clear();
        self.messages.push(greeting());
    }
}

fn greeting() -> Message {
    Message {
        id: GREETING_ID,
        role: Role::Assistant,
        content: GREETING.to_string(),
        created_at: now(),
    }
}

fn now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_greeting() {
        let transcript = Transcript::new();
        assert_eq!(transcript.len(), 1);
        let first = &transcript.messages()[0];
        assert_eq!(first.id, GREETING_ID);
        assert_eq!(first.role, Role::Assistant);
        assert_eq!(first.content, GREETING);
    }

    #[test]
    fn ids_are_never_reused_after_clear() {
        let mut transcript = Transcript::new();
        let before = transcript.push(Role::User, "hello").id;
        transcript.clear();
        let after = transcript.push(Role::User, "again").id;
        assert!(after > before);
        assert_eq!(transcript.messages()[0].id, GREETING_ID);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), r#""assistant""#);
    }
}
