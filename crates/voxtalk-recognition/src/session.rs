//! One recognition attempt at a time, driven through a single dispatch point.

use crate::provider::{ProviderEvent, RecognitionProvider, RecognitionSettings};
use tokio::sync::mpsc;
use voxtalk_core::transcript;
use voxtalk_core::ResolvedTranscript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Listening,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Start,
    Stop,
    Provider(ProviderEvent),
}

/// What a dispatched input produced for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// The input had no effect in the current state.
    Ignored,
    Started,
    /// No recognition capability is available.
    Unsupported,
    Interim(String),
    Transcript(ResolvedTranscript),
    /// A final result arrived but nothing usable was said.
    Empty,
    Failed { code: String },
    Stopped,
    Ended,
}

pub struct VoiceSession {
    provider: Option<Box<dyn RecognitionProvider>>,
    threshold: f32,
    state: SessionState,
    events_rx: mpsc::UnboundedReceiver<ProviderEvent>,
}

impl VoiceSession {
    /// Wire `provider` to this session. `None` models an environment without
    /// speech recognition.
    pub fn new(
        provider: Option<Box<dyn RecognitionProvider>>,
        settings: &RecognitionSettings,
        threshold: f32,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let provider = provider.map(|mut p| {
            p.configure(settings);
            p.set_event_sender(events_tx);
            p
        });
        Self {
            provider,
            threshold,
            state: SessionState::Idle,
            events_rx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_supported(&self) -> bool {
        self.provider.is_some()
    }

    pub fn start(&mut self) -> SessionUpdate {
        self.dispatch(SessionInput::Start)
    }

    pub fn stop(&mut self) -> SessionUpdate {
        self.dispatch(SessionInput::Stop)
    }

    /// Wait for the provider's next callback and run it through [`dispatch`](Self::dispatch).
    ///
    /// Returns `None` once no provider can ever report again.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        let event = self.events_rx.recv().await?;
        Some(self.dispatch(SessionInput::Provider(event)))
    }

    pub fn dispatch(&mut self, input: SessionInput) -> SessionUpdate {
        match (self.state, input) {
            (SessionState::Idle, SessionInput::Start) => self.begin(),
            (SessionState::Listening, SessionInput::Start) => {
                tracing::debug!("start ignored, already listening");
                SessionUpdate::Ignored
            }
            (SessionState::Listening, SessionInput::Stop) => {
                self.finish();
                SessionUpdate::Stopped
            }
            (SessionState::Idle, SessionInput::Stop) => SessionUpdate::Ignored,
            (SessionState::Listening, SessionInput::Provider(event)) => self.on_provider_event(event),
            (SessionState::Idle, SessionInput::Provider(event)) => {
                tracing::trace!(?event, "dropping provider event while idle");
                SessionUpdate::Ignored
            }
        }
    }

    fn begin(&mut self) -> SessionUpdate {
        let Some(provider) = self.provider.as_mut() else {
            tracing::warn!("speech recognition unsupported in this environment");
            return SessionUpdate::Unsupported;
        };

        // Leftovers from an earlier attempt must not leak into this one.
        while self.events_rx.try_recv().is_ok() {}

        if let Err(e) = provider.start() {
            tracing::error!(provider = %provider.name(), "{e}");
            return SessionUpdate::Failed {
                code: "start-failed".to_string(),
            };
        }

        tracing::debug!(provider = %provider.name(), "listening");
        self.state = SessionState::Listening;
        SessionUpdate::Started
    }

    fn on_provider_event(&mut self, event: ProviderEvent) -> SessionUpdate {
        match event {
            ProviderEvent::Result(event) if event.has_final() => {
                let resolved = transcript::resolve(&event, self.threshold);
                self.finish();
                match resolved {
                    Some(transcript) => {
                        tracing::debug!(
                            text = %transcript.text,
                            ambiguous = transcript.ambiguous,
                            "transcript resolved"
                        );
                        SessionUpdate::Transcript(transcript)
                    }
                    None => {
                        tracing::debug!("final result carried no usable text");
                        SessionUpdate::Empty
                    }
                }
            }
            ProviderEvent::Result(event) => transcript::interim_text(&event)
                .map(SessionUpdate::Interim)
                .unwrap_or(SessionUpdate::Ignored),
            ProviderEvent::Error { code } => {
                tracing::warn!(code = %code, "recognition failed");
                self.finish();
                SessionUpdate::Failed { code }
            }
            ProviderEvent::End => {
                tracing::debug!("recognition ended");
                self.state = SessionState::Idle;
                SessionUpdate::Ended
            }
        }
    }

    fn finish(&mut self) {
        if let Some(provider) = self.provider.as_mut() {
            provider.stop();
        }
        self.state = SessionState::Idle;
    }
}

impl Drop for VoiceSession {
    fn drop(&mut self) {
        if self.state == SessionState::Listening {
            self.finish();
        }
    }
}
