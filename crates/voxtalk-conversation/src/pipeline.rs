//! Sequences one conversational turn: user entry, chat request, assistant
//! entry, playback.

use crate::transport::{ChatRequest, ChatResponse, ChatTransport};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use voxtalk_core::config::{ChatConfig, ConversationConfig};
use voxtalk_core::{
    Author, ConversationMessage, ConversationState, ResolvedTranscript, TransportError,
};
use voxtalk_synthesis::SynthesisHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub model: Option<String>,
    pub include_history: bool,
    pub speak_errors: bool,
    pub error_message: String,
}

impl PipelineSettings {
    pub fn from_config(chat: &ChatConfig, conversation: &ConversationConfig) -> Self {
        Self {
            model: chat.model.clone(),
            include_history: chat.include_history,
            speak_errors: conversation.speak_errors,
            error_message: conversation.error_message.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default(), &ConversationConfig::default())
    }
}

pub struct ConversationPipeline {
    transport: Arc<dyn ChatTransport>,
    synthesis: Option<SynthesisHandle>,
    settings: PipelineSettings,
    state: ConversationState,
    last_sequence: u64,
    state_tx: watch::Sender<ConversationState>,
}

impl ConversationPipeline {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        synthesis: Option<SynthesisHandle>,
        settings: PipelineSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConversationState::default());
        Self {
            transport,
            synthesis,
            settings,
            state: ConversationState::default(),
            last_sequence: 0,
            state_tx,
        }
    }

    /// Read model for renderers; every change to the state is published here.
    /// A failed turn shows up as `last_error` next to its apology entry.
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.state.messages
    }

    /// Run one turn for `text`. Failures end up as a chat entry, never as an error.
    pub async fn on_transcript(&mut self, text: &str) {
        if text.trim().is_empty() {
            tracing::debug!("empty transcript, no request issued");
            return;
        }

        let context = self
            .settings
            .include_history
            .then(|| self.state.messages.clone());

        let sequence = self.append(Author::User, text);
        self.state.pending_request = true;
        self.state.last_error = None;
        self.publish();

        let request = ChatRequest {
            message: text.to_string(),
            model: self.settings.model.clone(),
            context,
        };
        tracing::debug!(sequence, "sending chat request");
        let result = self.transport.send(&request).await;
        self.on_response(result);
    }

    /// Record the outcome of the chat request issued for the latest user entry.
    pub fn on_response(&mut self, result: Result<ChatResponse, TransportError>) {
        self.state.pending_request = false;

        match result {
            Ok(response) => {
                self.append(Author::Assistant, &response.message);
                self.publish();
                self.speak(&response.message);
            }
            Err(e) => {
                tracing::error!("chat request failed: {e}");
                self.state.last_error = Some(e.to_string());
                let apology = self.settings.error_message.clone();
                self.append(Author::Assistant, &apology);
                self.publish();
                if self.settings.speak_errors {
                    self.speak(&apology);
                }
            }
        }
    }

    /// Consume transcripts in arrival order until the sender side closes.
    /// The task yields the final state.
    pub fn spawn(
        mut self,
        mut transcripts: mpsc::UnboundedReceiver<ResolvedTranscript>,
    ) -> JoinHandle<ConversationState> {
        tokio::spawn(async move {
            while let Some(transcript) = transcripts.recv().await {
                if transcript.ambiguous {
                    tracing::info!(text = %transcript.text, "sending ambiguous transcript");
                }
                self.on_transcript(&transcript.text).await;
            }
            self.state
        })
    }

    fn append(&mut self, author: Author, text: &str) -> u64 {
        self.last_sequence += 1;
        self.state.messages.push(ConversationMessage {
            text: text.to_string(),
            author,
            sequence: self.last_sequence,
        });
        self.last_sequence
    }

    fn speak(&self, text: &str) {
        match self.synthesis.as_ref() {
            Some(synthesis) => synthesis.speak(text),
            None => tracing::debug!("no synthesis available, reply not spoken"),
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}
