//! Owns the synthesis provider: voice selection, one utterance at a time, and
//! the keep-alive watchdog that stops long utterances from being dropped.

use crate::provider::{SynthesisEvent, SynthesisProvider, Utterance};
use crate::voice::select_voice;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use voxtalk_core::config::SynthesisConfig;
use voxtalk_core::VoiceCatalogEntry;

const DEFAULT_RATE: f32 = 1.0;
const DEFAULT_PITCH: f32 = 1.0;
const DEFAULT_VOLUME: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub keep_alive: Duration,
    pub quality_markers: Vec<String>,
    /// How long the host lets the active utterance run once its last
    /// handle is gone.
    pub drain_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from(&SynthesisConfig::default())
    }
}

impl From<&SynthesisConfig> for CoordinatorSettings {
    fn from(config: &SynthesisConfig) -> Self {
        Self {
            keep_alive: Duration::from_secs(config.keep_alive_secs),
            quality_markers: config.quality_markers.clone(),
            drain_timeout: Duration::from_secs(config.drain_secs),
        }
    }
}

/// Playback notifications that survived stale-event filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackUpdate {
    Started { id: u64 },
    Finished { id: u64 },
    Failed { id: u64, code: String },
    CatalogUpdated { voice: Option<VoiceCatalogEntry> },
    /// Event for an utterance that is no longer current.
    Ignored,
}

pub struct VoiceSynthesisCoordinator {
    provider: Arc<dyn SynthesisProvider>,
    events_rx: mpsc::UnboundedReceiver<SynthesisEvent>,
    settings: CoordinatorSettings,
    catalog: Vec<VoiceCatalogEntry>,
    voice: Option<VoiceCatalogEntry>,
    active: Option<u64>,
    next_id: u64,
    watchdog: Option<JoinHandle<()>>,
}

impl VoiceSynthesisCoordinator {
    pub fn new(mut provider: Box<dyn SynthesisProvider>, settings: CoordinatorSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        provider.set_event_sender(events_tx);
        let provider: Arc<dyn SynthesisProvider> = Arc::from(provider);

        let mut coordinator = Self {
            provider,
            events_rx,
            settings,
            catalog: Vec::new(),
            voice: None,
            active: None,
            next_id: 1,
            watchdog: None,
        };
        coordinator.refresh_catalog();
        coordinator
    }

    pub fn catalog(&self) -> &[VoiceCatalogEntry] {
        &self.catalog
    }

    pub fn selected_voice(&self) -> Option<&VoiceCatalogEntry> {
        self.voice.as_ref()
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Id of the utterance currently owned by the provider, if any.
    pub fn active_utterance(&self) -> Option<u64> {
        self.active
    }

    pub fn refresh_catalog(&mut self) {
        let voices = self.provider.voices();
        self.update_catalog(voices);
    }

    /// Replace the catalog and reselect the voice. Accepted at any time.
    pub fn update_catalog(&mut self, voices: Vec<VoiceCatalogEntry>) {
        self.catalog = voices;
        self.voice = select_voice(&self.catalog, &self.settings.quality_markers).cloned();
        tracing::debug!(
            voices = self.catalog.len(),
            selected = ?self.voice.as_ref().map(|v| v.name.as_str()),
            "voice catalog updated"
        );
    }

    /// Cancel whatever is playing and submit `text`. Returns the new
    /// utterance id, or `None` when nothing was submitted.
    pub fn speak(&mut self, text: &str) -> Option<u64> {
        if text.trim().is_empty() {
            return None;
        }
        if self.active.is_some() || self.provider.is_speaking() {
            self.cancel();
        }

        let id = self.next_id;
        self.next_id += 1;
        let utterance = Utterance {
            id,
            text: text.to_string(),
            voice: self.voice.clone(),
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
            volume: DEFAULT_VOLUME,
        };

        if let Err(e) = self.provider.speak(utterance) {
            tracing::error!(provider = %self.provider.name(), utterance = id, "{e}");
            return None;
        }

        self.active = Some(id);
        self.watchdog = spawn_keep_alive(Arc::clone(&self.provider), self.settings.keep_alive);
        Some(id)
    }

    /// Stop playback and the watchdog. Late events for the cancelled
    /// utterance are ignored.
    pub fn cancel(&mut self) {
        self.provider.cancel();
        self.stop_watchdog();
        if let Some(id) = self.active.take() {
            tracing::debug!(utterance = id, "utterance cancelled");
        }
    }

    pub fn handle_event(&mut self, event: SynthesisEvent) -> PlaybackUpdate {
        match event {
            SynthesisEvent::VoicesChanged => {
                self.refresh_catalog();
                PlaybackUpdate::CatalogUpdated {
                    voice: self.voice.clone(),
                }
            }
            SynthesisEvent::Started { id } if self.active == Some(id) => {
                PlaybackUpdate::Started { id }
            }
            SynthesisEvent::Finished { id } if self.active == Some(id) => {
                self.settle();
                PlaybackUpdate::Finished { id }
            }
            SynthesisEvent::Failed { id, code } if self.active == Some(id) => {
                tracing::warn!(utterance = id, code = %code, "playback failed");
                self.settle();
                PlaybackUpdate::Failed { id, code }
            }
            stale => {
                tracing::trace!(?stale, "ignoring event for inactive utterance");
                PlaybackUpdate::Ignored
            }
        }
    }

    /// Wait for the provider's next notification and apply it.
    pub async fn next_update(&mut self) -> Option<PlaybackUpdate> {
        let event = self.events_rx.recv().await?;
        Some(self.handle_event(event))
    }

    fn settle(&mut self) {
        self.stop_watchdog();
        self.active = None;
    }

    fn stop_watchdog(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.abort();
        }
    }
}

impl Drop for VoiceSynthesisCoordinator {
    fn drop(&mut self) {
        self.stop_watchdog();
    }
}

/// Nudge the provider with pause/resume every `period` while it is speaking.
fn spawn_keep_alive(
    provider: Arc<dyn SynthesisProvider>,
    period: Duration,
) -> Option<JoinHandle<()>> {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("no async runtime, keep-alive watchdog disabled");
        return None;
    };

    Some(runtime.spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            if !provider.is_speaking() {
                break;
            }
            tracing::trace!("keep-alive pause/resume");
            provider.pause();
            provider.resume();
        }
    }))
}
