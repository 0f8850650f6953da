use crate::provider::{ProviderEvent, RecognitionProvider, RecognitionSettings};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use voxtalk_core::{RecognitionAlternative, RecognitionError, RecognitionEvent, RecognitionResult};

/// Replays canned event scripts, one script per `start()`.
pub struct ScriptedRecognizer {
    scripts: VecDeque<Vec<ProviderEvent>>,
    sender: Option<mpsc::UnboundedSender<ProviderEvent>>,
    settings: RecognitionSettings,
    counters: ScriptCounters,
}

/// Shared view of how often the underlying provider was started and stopped.
#[derive(Debug, Clone, Default)]
pub struct ScriptCounters {
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl ScriptCounters {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::Relaxed)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::Relaxed)
    }
}

impl ScriptedRecognizer {
    pub fn new(scripts: Vec<Vec<ProviderEvent>>) -> Self {
        Self {
            scripts: scripts.into(),
            sender: None,
            settings: RecognitionSettings::default(),
            counters: ScriptCounters::default(),
        }
    }

    pub fn counters(&self) -> ScriptCounters {
        self.counters.clone()
    }

    pub fn settings(&self) -> &RecognitionSettings {
        &self.settings
    }

    /// A single final result followed by `End`.
    pub fn utterance(alternatives: &[(&str, f32)]) -> Vec<ProviderEvent> {
        let alternatives = alternatives
            .iter()
            .map(|(text, confidence)| RecognitionAlternative::new(*text, *confidence))
            .collect();
        vec![
            ProviderEvent::Result(RecognitionEvent {
                start_index: 0,
                results: vec![RecognitionResult {
                    alternatives,
                    is_final: true,
                }],
            }),
            ProviderEvent::End,
        ]
    }
}

impl Default for ScriptedRecognizer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RecognitionProvider for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn configure(&mut self, settings: &RecognitionSettings) {
        self.settings = settings.clone();
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<ProviderEvent>) {
        self.sender = Some(sender);
    }

    fn start(&mut self) -> Result<(), RecognitionError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| RecognitionError::StartFailed("no event sender attached".to_string()))?;
        self.counters.starts.fetch_add(1, Ordering::Relaxed);

        // No script left: stay silent until stopped.
        if let Some(script) = self.scripts.pop_front() {
            for event in script {
                let _ = sender.send(event);
            }
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.counters.stops.fetch_add(1, Ordering::Relaxed);
    }
}
