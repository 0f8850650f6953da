use serde::{Deserialize, Serialize};

/// One ranked guess from the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub confidence: f32,
}

impl RecognitionAlternative {
    pub fn new(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub alternatives: Vec<RecognitionAlternative>,
    pub is_final: bool,
}

/// A batch of results delivered by a recognition provider. Only results at or
/// after `start_index` are new in this event.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionEvent {
    pub start_index: usize,
    pub results: Vec<RecognitionResult>,
}

impl RecognitionEvent {
    /// Results this event actually introduces.
    pub fn fresh_results(&self) -> &[RecognitionResult] {
        self.results.get(self.start_index..).unwrap_or(&[])
    }

    pub fn has_final(&self) -> bool {
        self.fresh_results().iter().any(|r| r.is_final)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTranscript {
    pub text: String,
    pub ambiguous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceCatalogEntry {
    pub name: String,
    pub lang: String,
}

impl VoiceCatalogEntry {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub text: String,
    pub author: Author,
    pub sequence: u64,
}

/// Snapshot of the conversation, published to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub messages: Vec<ConversationMessage>,
    pub pending_request: bool,
    /// Set when the latest chat request failed; cleared when the next one starts.
    pub last_error: Option<String>,
}
