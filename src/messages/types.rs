use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MessageId = u64;

/// A sent chat message; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: Option<String>,
    pub audio_uri: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn has_audio(&self) -> bool {
        self.audio_uri.is_some()
    }
}

/// Message content before it is sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftMessage {
    pub text: Option<String>,
    pub audio_uri: Option<String>,
}

impl DraftMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            audio_uri: None,
        }
    }

    pub fn audio(uri: impl Into<String>) -> Self {
        Self {
            text: None,
            audio_uri: Some(uri.into()),
        }
    }

    pub fn with_audio(mut self, uri: impl Into<String>) -> Self {
        self.audio_uri = Some(uri.into());
        self
    }

    /// No text (ignoring whitespace) and no audio
    pub fn is_empty(&self) -> bool {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        !has_text && self.audio_uri.is_none()
    }
}
