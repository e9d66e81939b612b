//! Conversation turns used by multi-turn backends (blackboard debate agents).

use serde::{Deserialize, Serialize};

/// One turn of a conversation: what the caller said, or what the model answered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "text", rename_all = "lowercase")]
pub enum Message {
    User(String),
    Model(String),
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User(text.into())
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::Model(text.into())
    }

    /// Role name as rendered in transcripts and in the Gemini `contents` array.
    pub fn role(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Model(_) => "model",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::User(s) | Self::Model(s) => s,
        }
    }
}

/// Renders a history as a plain transcript, one `role: text` block per turn.
///
/// Used by backends without native multi-turn support.
pub fn render_transcript(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role(), m.text().trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_transcript_joins_turns_with_roles() {
        let h = vec![Message::user("hi"), Message::model(" hello \n")];
        assert_eq!(render_transcript(&h), "user: hi\n\nmodel: hello");
    }

    #[test]
    fn serializes_with_role_tag() {
        let v = serde_json::to_value(Message::model("x")).unwrap();
        assert_eq!(v, serde_json::json!({"role": "model", "text": "x"}));
    }
}
