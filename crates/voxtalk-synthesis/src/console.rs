use crate::provider::{SynthesisEvent, SynthesisProvider, Utterance};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use voxtalk_core::{SynthesisError, VoiceCatalogEntry};

const MIN_UTTERANCE: Duration = Duration::from_millis(500);

#[derive(Default)]
struct Playback {
    sender: Option<mpsc::UnboundedSender<SynthesisEvent>>,
    current: Option<(u64, JoinHandle<()>)>,
}

/// Logs utterances instead of playing audio, paced like speech.
pub struct ConsoleSynthesizer {
    playback: Arc<Mutex<Playback>>,
    words_per_minute: u32,
}

impl ConsoleSynthesizer {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            playback: Arc::new(Mutex::new(Playback::default())),
            words_per_minute: words_per_minute.max(1),
        }
    }

    fn speaking_time(&self, text: &str) -> Duration {
        let words = text.split_whitespace().count() as u64;
        let millis = words * 60_000 / u64::from(self.words_per_minute);
        Duration::from_millis(millis).max(MIN_UTTERANCE)
    }
}

impl Default for ConsoleSynthesizer {
    fn default() -> Self {
        Self::new(180)
    }
}

impl SynthesisProvider for ConsoleSynthesizer {
    fn name(&self) -> &str {
        "console"
    }

    fn voices(&self) -> Vec<VoiceCatalogEntry> {
        vec![
            VoiceCatalogEntry::new("Console", "en-US"),
            VoiceCatalogEntry::new("Console (Enhanced)", "en-US"),
            VoiceCatalogEntry::new("Console", "fr-FR"),
        ]
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<SynthesisEvent>) {
        // Catalog is "loaded" once someone is listening.
        let _ = sender.send(SynthesisEvent::VoicesChanged);
        if let Ok(mut playback) = self.playback.lock() {
            playback.sender = Some(sender);
        }
    }

    fn speak(&self, utterance: Utterance) -> Result<(), SynthesisError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SynthesisError::PlaybackFailed(e.to_string()))?;
        let mut playback = self
            .playback
            .lock()
            .map_err(|_| SynthesisError::PlaybackFailed("playback state poisoned".to_string()))?;
        let sender = playback
            .sender
            .clone()
            .ok_or_else(|| SynthesisError::PlaybackFailed("no event sender attached".to_string()))?;

        tracing::info!(
            utterance = utterance.id,
            voice = ?utterance.voice.as_ref().map(|v| v.name.as_str()),
            "speaking: {}",
            utterance.text,
        );

        let id = utterance.id;
        let duration = self.speaking_time(&utterance.text);
        let shared = Arc::clone(&self.playback);
        let task = runtime.spawn(async move {
            let _ = sender.send(SynthesisEvent::Started { id });
            tokio::time::sleep(duration).await;
            if let Ok(mut playback) = shared.lock() {
                if playback.current.as_ref().map(|(current, _)| *current) == Some(id) {
                    playback.current = None;
                }
            }
            let _ = sender.send(SynthesisEvent::Finished { id });
        });

        if let Some((previous, task)) = playback.current.replace((id, task)) {
            task.abort();
            tracing::debug!(utterance = previous, "utterance replaced");
        }
        Ok(())
    }

    fn cancel(&self) {
        let Ok(mut playback) = self.playback.lock() else {
            return;
        };
        if let Some((id, task)) = playback.current.take() {
            task.abort();
            if let Some(sender) = playback.sender.as_ref() {
                let _ = sender.send(SynthesisEvent::Failed {
                    id,
                    code: "interrupted".to_string(),
                });
            }
        }
    }

    // Logged output has no buffer to stall, so keep-alive nudges are no-ops.
    fn pause(&self) {
        tracing::trace!("console playback paused");
    }

    fn resume(&self) {
        tracing::trace!("console playback resumed");
    }

    fn is_speaking(&self) -> bool {
        self.playback
            .lock()
            .map(|p| p.current.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(id: u64, text: &str) -> Utterance {
        Utterance {
            id,
            text: text.to_string(),
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }

    fn attached() -> (ConsoleSynthesizer, mpsc::UnboundedReceiver<SynthesisEvent>) {
        let mut synth = ConsoleSynthesizer::new(60);
        let (tx, mut rx) = mpsc::unbounded_channel();
        synth.set_event_sender(tx);
        assert_eq!(rx.try_recv(), Ok(SynthesisEvent::VoicesChanged));
        (synth, rx)
    }

    #[test]
    fn test_speaking_time_scales_with_words() {
        let synth = ConsoleSynthesizer::new(60);
        assert_eq!(synth.speaking_time("one two three"), Duration::from_secs(3));
        assert_eq!(synth.speaking_time(""), MIN_UTTERANCE);
    }

    #[test]
    fn test_speak_outside_runtime_fails() {
        let (synth, _rx) = attached();
        assert!(matches!(
            synth.speak(utterance(1, "hi")),
            Err(SynthesisError::PlaybackFailed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_utterance_runs_to_completion() {
        let (synth, mut rx) = attached();
        synth.speak(utterance(1, "one two")).unwrap();
        assert!(synth.is_speaking());

        assert_eq!(rx.recv().await, Some(SynthesisEvent::Started { id: 1 }));
        assert_eq!(rx.recv().await, Some(SynthesisEvent::Finished { id: 1 }));
        assert!(!synth.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_current_utterance() {
        let (synth, mut rx) = attached();
        synth.speak(utterance(7, "a long sentence to cancel")).unwrap();
        tokio::task::yield_now().await;
        synth.cancel();

        assert!(!synth.is_speaking());
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&SynthesisEvent::Failed {
            id: 7,
            code: "interrupted".to_string()
        }));
        assert!(!events.contains(&SynthesisEvent::Finished { id: 7 }));
    }
}
