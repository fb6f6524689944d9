// ABOUTME: Fixed-shape transcript message — a role tag plus non-empty text.
// ABOUTME: Validated at construction and immutable afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    role: Role,
    text: String,
}

impl Message {
    /// Create a message, rejecting blank text.
    pub fn new(role: Role, text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(Self { role, text })
    }

    pub fn user(text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::Assistant, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_blank_text() {
        assert_eq!(Message::user(""), Err(ValidationError::EmptyMessage));
        assert_eq!(
            Message::assistant("  \n\t"),
            Err(ValidationError::EmptyMessage)
        );
    }

    #[test]
    fn keeps_text_verbatim() {
        let msg = Message::user("  Obat apa untuk demam?  ").unwrap();
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.text(), "  Obat apa untuk demam?  ");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("ok").unwrap()).unwrap();
        assert_eq!(json, r#"{"role":"assistant","text":"ok"}"#);
    }
}
