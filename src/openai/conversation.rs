//! Message history for a chat session

use std::fmt;

use crate::types::{ChatMessage, Role};

/// Ordered chat history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text message; `name` labels function results
    pub fn add_message(&mut self, role: Role, content: impl Into<String>, name: Option<&str>) {
        let mut message = ChatMessage::new(role, content);
        message.name = name.map(str::to_string);
        self.messages.push(message);
    }

    /// Append a message as-is
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Messages in the order they were added
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent message, if any
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the conversation has no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consume the conversation, returning its messages
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

impl From<Vec<ChatMessage>> for Conversation {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

/// `role: content` per message, separated by blank lines
impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, message) in self.messages.iter().enumerate() {
            if position > 0 {
                writeln!(f)?;
            }
            writeln!(
                f,
                "{}: {}",
                message.role.as_str(),
                message.content.as_deref().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}
