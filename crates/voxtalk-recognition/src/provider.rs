use tokio::sync::mpsc;
use voxtalk_core::config::RecognitionConfig;
use voxtalk_core::{RecognitionError, RecognitionEvent};

/// Knobs applied to a provider before every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
    pub language: String,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self::from(&RecognitionConfig::default())
    }
}

impl From<&RecognitionConfig> for RecognitionSettings {
    fn from(config: &RecognitionConfig) -> Self {
        Self {
            continuous: config.continuous,
            interim_results: config.interim_results,
            max_alternatives: config.max_alternatives,
            language: config.language.clone(),
        }
    }
}

/// Callbacks a provider reports back, delivered over the session's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Result(RecognitionEvent),
    Error { code: String },
    End,
}

/// An external speech-to-text capability.
///
/// `start` must not block: results arrive later through the sender handed over
/// in [`set_event_sender`](Self::set_event_sender).
pub trait RecognitionProvider: Send {
    fn name(&self) -> &str;
    fn configure(&mut self, settings: &RecognitionSettings);
    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<ProviderEvent>);
    fn start(&mut self) -> Result<(), RecognitionError>;
    /// Abort the current attempt and release the underlying resource. Must be
    /// safe to call when nothing is running.
    fn stop(&mut self);
}
