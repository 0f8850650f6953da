use crate::coordinator::{PlaybackUpdate, VoiceSynthesisCoordinator};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisCommand {
    Speak(String),
    Cancel,
}

/// Cheap, cloneable way to ask the coordinator task for playback.
#[derive(Debug, Clone)]
pub struct SynthesisHandle {
    cmd_tx: mpsc::UnboundedSender<SynthesisCommand>,
}

impl SynthesisHandle {
    /// Queue `text` for playback without waiting for it to be heard.
    pub fn speak(&self, text: impl Into<String>) {
        if self.cmd_tx.send(SynthesisCommand::Speak(text.into())).is_err() {
            tracing::warn!("synthesis host has shut down, dropping utterance");
        }
    }

    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(SynthesisCommand::Cancel);
    }

    /// Handle backed by a plain channel, for callers that want to observe
    /// commands instead of running a coordinator.
    pub fn from_sender(cmd_tx: mpsc::UnboundedSender<SynthesisCommand>) -> Self {
        Self { cmd_tx }
    }
}

/// Runs a [`VoiceSynthesisCoordinator`] on its own task so that every
/// play/cancel on the provider goes through one place.
pub struct SynthesisHost {
    task_handle: Option<JoinHandle<()>>,
}

impl SynthesisHost {
    /// Spawn the coordinator task. It runs until every [`SynthesisHandle`]
    /// has been dropped, then lets the current utterance play out for at
    /// most the coordinator's drain timeout before cancelling it.
    pub fn start(mut coordinator: VoiceSynthesisCoordinator) -> (Self, SynthesisHandle) {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();

        let task_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => match cmd {
                        Some(SynthesisCommand::Speak(text)) => {
                            coordinator.speak(&text);
                        }
                        Some(SynthesisCommand::Cancel) => coordinator.cancel(),
                        None => break,
                    },
                    Some(update) = coordinator.next_update() => log_update(&update),
                }
            }
            drain(&mut coordinator).await;
        });

        let host = Self {
            task_handle: Some(task_handle),
        };
        (host, SynthesisHandle { cmd_tx })
    }

    /// Wait for the coordinator task. Drop every handle first.
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }
    }
}

async fn drain(coordinator: &mut VoiceSynthesisCoordinator) {
    let Some(id) = coordinator.active_utterance() else {
        return;
    };
    let limit = coordinator.settings().drain_timeout;
    tracing::debug!(utterance = id, "waiting for last utterance");

    let finished = tokio::time::timeout(limit, async {
        while coordinator.active_utterance().is_some() {
            match coordinator.next_update().await {
                Some(update) => log_update(&update),
                None => break,
            }
        }
    })
    .await;

    if finished.is_err() || coordinator.active_utterance().is_some() {
        tracing::warn!(utterance = id, "last utterance still playing at shutdown, cancelling");
        coordinator.cancel();
    }
}

fn log_update(update: &PlaybackUpdate) {
    match update {
        PlaybackUpdate::Started { id } => {
            tracing::debug!(utterance = id, "playback started");
        }
        PlaybackUpdate::Finished { id } => {
            tracing::debug!(utterance = id, "playback finished");
        }
        PlaybackUpdate::CatalogUpdated { voice } => {
            tracing::info!(
                voice = ?voice.as_ref().map(|v| v.name.as_str()),
                "synthesis voice selected"
            );
        }
        PlaybackUpdate::Failed { .. } | PlaybackUpdate::Ignored => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::CoordinatorSettings;
    use crate::provider::{SynthesisEvent, SynthesisProvider, Utterance};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use voxtalk_core::{SynthesisError, VoiceCatalogEntry};

    /// Plays every utterance for `length`, recording provider calls.
    struct TimedSynthesizer {
        length: Duration,
        calls: Arc<Mutex<Vec<String>>>,
        speaking: Arc<AtomicBool>,
        sender: Option<mpsc::UnboundedSender<SynthesisEvent>>,
    }

    impl TimedSynthesizer {
        fn new(length: Duration) -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let synthesizer = Self {
                length,
                calls: Arc::clone(&calls),
                speaking: Arc::new(AtomicBool::new(false)),
                sender: None,
            };
            (synthesizer, calls)
        }
    }

    impl SynthesisProvider for TimedSynthesizer {
        fn name(&self) -> &str {
            "timed"
        }

        fn voices(&self) -> Vec<VoiceCatalogEntry> {
            Vec::new()
        }

        fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<SynthesisEvent>) {
            self.sender = Some(sender);
        }

        fn speak(&self, utterance: Utterance) -> Result<(), SynthesisError> {
            self.calls.lock().unwrap().push(format!("speak:{}", utterance.text));
            self.speaking.store(true, Ordering::SeqCst);
            let sender = self.sender.clone().unwrap();
            let speaking = Arc::clone(&self.speaking);
            let length = self.length;
            tokio::spawn(async move {
                let _ = sender.send(SynthesisEvent::Started { id: utterance.id });
                tokio::time::sleep(length).await;
                speaking.store(false, Ordering::SeqCst);
                let _ = sender.send(SynthesisEvent::Finished { id: utterance.id });
            });
            Ok(())
        }

        fn cancel(&self) {
            self.calls.lock().unwrap().push("cancel".to_string());
            self.speaking.store(false, Ordering::SeqCst);
        }

        fn pause(&self) {}

        fn resume(&self) {}

        fn is_speaking(&self) -> bool {
            self.speaking.load(Ordering::SeqCst)
        }
    }

    fn host_with(
        length: Duration,
        drain_timeout: Duration,
    ) -> (SynthesisHost, SynthesisHandle, Arc<Mutex<Vec<String>>>) {
        let (synthesizer, calls) = TimedSynthesizer::new(length);
        let settings = CoordinatorSettings {
            drain_timeout,
            ..CoordinatorSettings::default()
        };
        let coordinator = VoiceSynthesisCoordinator::new(Box::new(synthesizer), settings);
        let (host, handle) = SynthesisHost::start(coordinator);
        (host, handle, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_reply_plays_out_after_handles_drop() {
        let (mut host, handle, calls) = host_with(Duration::from_secs(3), Duration::from_secs(30));

        handle.speak("final reply");
        drop(handle);
        host.shutdown().await;

        assert_eq!(*calls.lock().unwrap(), vec!["speak:final reply".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_is_bounded() {
        let (mut host, handle, calls) = host_with(Duration::from_secs(600), Duration::from_secs(5));

        handle.speak("a very long reply");
        drop(handle);
        let started = tokio::time::Instant::now();
        host.shutdown().await;

        assert!(started.elapsed() < Duration::from_secs(600));
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["speak:a very long reply".to_string(), "cancel".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_cancel_stops_playback_before_shutdown() {
        let (mut host, handle, calls) = host_with(Duration::from_secs(3), Duration::from_secs(30));

        handle.speak("interrupted reply");
        handle.cancel();
        drop(handle);
        host.shutdown().await;

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["speak:interrupted reply".to_string(), "cancel".to_string()]
        );
    }
}
