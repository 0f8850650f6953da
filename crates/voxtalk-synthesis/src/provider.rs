use tokio::sync::mpsc;
use voxtalk_core::{SynthesisError, VoiceCatalogEntry};

/// A unit of text submitted for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
    /// `None` leaves the choice to the provider's default voice.
    pub voice: Option<VoiceCatalogEntry>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Notifications a synthesis provider reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    Started { id: u64 },
    Finished { id: u64 },
    Failed { id: u64, code: String },
    /// The voice catalog changed; call [`SynthesisProvider::voices`] again.
    VoicesChanged,
}

/// An external text-to-speech capability shared by the coordinator and its
/// keep-alive watchdog.
pub trait SynthesisProvider: Send + Sync {
    fn name(&self) -> &str;
    /// Voices known right now. May be empty until the provider has loaded them.
    fn voices(&self) -> Vec<VoiceCatalogEntry>;
    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<SynthesisEvent>);
    fn speak(&self, utterance: Utterance) -> Result<(), SynthesisError>;
    fn cancel(&self);
    fn pause(&self);
    fn resume(&self);
    fn is_speaking(&self) -> bool;
}
