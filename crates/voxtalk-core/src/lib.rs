pub mod config;
pub mod error;
pub mod transcript;
pub mod types;

pub use config::AppConfig;
pub use error::{ConfigError, RecognitionError, SynthesisError, TransportError};
pub use transcript::{Resolution, DEFAULT_CONFIDENCE_THRESHOLD};
pub use types::{
    Author, ConversationMessage, ConversationState, RecognitionAlternative, RecognitionEvent,
    RecognitionResult, ResolvedTranscript, VoiceCatalogEntry,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_event_fresh_results() {
        let result = RecognitionResult {
            alternatives: vec![RecognitionAlternative::new("hi", 0.5)],
            is_final: true,
        };
        let event = RecognitionEvent {
            start_index: 1,
            results: vec![result.clone(), result.clone()],
        };
        assert_eq!(event.fresh_results().len(), 1);
        assert!(event.has_final());
    }

    #[test]
    fn test_conversation_state_default() {
        let state = ConversationState::default();
        assert!(state.messages.is_empty());
        assert!(!state.pending_request);
    }

    #[test]
    fn test_author_serializes_lowercase() {
        let msg = ConversationMessage {
            text: "hi".to_string(),
            author: Author::Assistant,
            sequence: 2,
        };
        let value = toml::Value::try_from(&msg).unwrap();
        assert_eq!(value.get("author").unwrap().as_str(), Some("assistant"));
    }
}
