//! Conversation messages exchanged with the completion service

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    System,
    /// The simulated partner, or the experimenter's instruction
    User,
    /// The language model under study
    Assistant,
}

/// One conversational turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Speaker,
    pub content: String,
}

impl Message {
    pub fn new(role: Speaker, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Speaker::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, content)
    }

    pub fn is_ai(&self) -> bool {
        self.role == Speaker::Assistant
    }
}

/// Utterances of a conversation, in order
pub fn transcript(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.content.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_wire_format() {
        let json = serde_json::to_string(&Message::assistant("project green")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"project green"}"#);

        let parsed: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(parsed, Message::user("hi"));
        assert!(!parsed.is_ai());
    }

    #[test]
    fn test_transcript_keeps_order() {
        let messages = vec![Message::user("rules"), Message::assistant("a"), Message::user("b")];
        assert_eq!(transcript(&messages), vec!["rules", "a", "b"]);
    }
}
