use crate::provider::{ProviderEvent, RecognitionProvider, RecognitionSettings};
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use voxtalk_core::{RecognitionAlternative, RecognitionError, RecognitionEvent, RecognitionResult};

/// Error code reported once stdin is exhausted.
pub const INPUT_CLOSED: &str = "input-closed";

type LineReceiver = mpsc::UnboundedReceiver<std::io::Result<String>>;

/// Treats each line typed on stdin as one spoken utterance.
///
/// Lines are read on a dedicated OS thread. A blocking read there never
/// holds up runtime shutdown, so stopping mid-utterance does not wait for
/// the user to press Enter.
pub struct ConsoleRecognizer {
    source: Option<Box<dyn BufRead + Send>>,
    lines: Arc<Mutex<LineReceiver>>,
    lines_tx: Option<mpsc::UnboundedSender<std::io::Result<String>>>,
    sender: Option<mpsc::UnboundedSender<ProviderEvent>>,
    task: Option<JoinHandle<()>>,
}

impl ConsoleRecognizer {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(std::io::stdin()))
    }

    /// Read utterances from any line source instead of stdin.
    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        let (lines_tx, lines_rx) = mpsc::unbounded_channel();
        Self {
            source: Some(Box::new(reader)),
            lines: Arc::new(Mutex::new(lines_rx)),
            lines_tx: Some(lines_tx),
            sender: None,
            task: None,
        }
    }

    /// Start the reader thread on first use.
    fn ensure_reader(&mut self) -> Result<(), RecognitionError> {
        let (Some(source), Some(lines_tx)) = (self.source.take(), self.lines_tx.take()) else {
            return Ok(());
        };
        std::thread::Builder::new()
            .name("console-recognizer".to_string())
            .spawn(move || {
                for line in source.lines() {
                    let failed = line.is_err();
                    if lines_tx.send(line).is_err() || failed {
                        break;
                    }
                }
                tracing::debug!("console input closed");
            })
            .map_err(|e| RecognitionError::StartFailed(e.to_string()))?;
        Ok(())
    }
}

impl Default for ConsoleRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

fn typed_line(text: String) -> RecognitionEvent {
    RecognitionEvent {
        start_index: 0,
        results: vec![RecognitionResult {
            alternatives: vec![RecognitionAlternative::new(text, 1.0)],
            is_final: true,
        }],
    }
}

impl RecognitionProvider for ConsoleRecognizer {
    fn name(&self) -> &str {
        "console"
    }

    fn configure(&mut self, settings: &RecognitionSettings) {
        tracing::debug!(
            language = %settings.language,
            max_alternatives = settings.max_alternatives,
            "ConsoleRecognizer configured (typed input is always a single final alternative)"
        );
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<ProviderEvent>) {
        self.sender = Some(sender);
    }

    fn start(&mut self) -> Result<(), RecognitionError> {
        let sender = self
            .sender
            .clone()
            .ok_or_else(|| RecognitionError::StartFailed("no event sender attached".to_string()))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| RecognitionError::StartFailed(e.to_string()))?;
        self.ensure_reader()?;
        let lines = Arc::clone(&self.lines);

        self.stop();
        self.task = Some(runtime.spawn(async move {
            // recv is cancel safe, so a stopped attempt never loses a line
            let line = lines.lock().await.recv().await;
            match line {
                Some(Ok(text)) => {
                    let _ = sender.send(ProviderEvent::Result(typed_line(text)));
                }
                None => {
                    let _ = sender.send(ProviderEvent::Error {
                        code: INPUT_CLOSED.to_string(),
                    });
                }
                Some(Err(e)) => {
                    tracing::warn!("stdin read failed: {e}");
                    let _ = sender.send(ProviderEvent::Error {
                        code: "audio-capture".to_string(),
                    });
                }
            }
            let _ = sender.send(ProviderEvent::End);
        }));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ConsoleRecognizer {
    fn drop(&mut self) {
        self.stop();
    }
}
