//! # Conversation
//! A conversation is what a completion provider consumes: an ordered list of role-tagged messages.
//!
//! Conversations usually come out of [ChatPromptTemplate::format](crate::prompt::ChatPromptTemplate::format),
//! but they are plain data and can be built by hand as well.

use serde::{Deserialize, Serialize};

/// Who a [Message] is from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }
}

/// Ordered sequence of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) -> &mut Self {
        self.messages.push(message);
        self
    }

    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the last human message, if any. When several human messages exist, the last one wins.
    pub fn last_human(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Human)
            .map(|m| m.content.as_str())
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}

#[cfg(test)]
mod test_conversation {
    use super::{Conversation, Message, Role};

    #[test]
    fn test_last_human_wins() {
        let conversation = Conversation::new(vec![
            Message::system("sys"),
            Message::human("first"),
            Message::human("second"),
        ]);
        assert_eq!(Some("second"), conversation.last_human());
    }

    #[test]
    fn test_no_human() {
        let conversation = Conversation::new(vec![Message::system("sys")]);
        assert_eq!(None, conversation.last_human());
        assert_eq!(None, Conversation::default().last_human());
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let conversation: Conversation = vec![Message::system("s"), Message::human("h")].into();
        let json = serde_json::to_value(&conversation).unwrap();
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[1]["role"], "human");
        assert_eq!(json[1]["content"], "h");
        let back: Conversation = serde_json::from_value(json).unwrap();
        assert_eq!(Role::Human, back.messages()[1].role);
    }
}
