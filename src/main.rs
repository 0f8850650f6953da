use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use voxtalk_conversation::{ConversationPipeline, HttpChatTransport, PipelineSettings};
use voxtalk_core::{Author, ConversationState, ResolvedTranscript};
use voxtalk_recognition::console::INPUT_CLOSED;
use voxtalk_recognition::{
    RecognitionSettings, RecognizerRegistry, SessionState, SessionUpdate, VoiceSession,
};
use voxtalk_synthesis::{
    CoordinatorSettings, SynthesisHost, SynthesizerRegistry, VoiceSynthesisCoordinator,
};

#[derive(Parser)]
#[command(name = "voxtalk", about = "Spoken conversation with a chat backend")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = voxtalk_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    // stdout carries the transcript, logs go to stderr
    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("voxtalk starting");

    let recognizer = RecognizerRegistry::new()
        .create_optional(&config.recognition.provider)
        .with_context(|| {
            format!(
                "failed to create recognition provider '{}'",
                config.recognition.provider
            )
        })?;
    let mut session = VoiceSession::new(
        recognizer,
        &RecognitionSettings::from(&config.recognition),
        config.recognition.confidence_threshold,
    );

    let synthesizer = SynthesizerRegistry::new()
        .create_optional(&config.synthesis.provider, &config.synthesis)
        .with_context(|| {
            format!(
                "failed to create synthesis provider '{}'",
                config.synthesis.provider
            )
        })?;
    let (synthesis_host, synthesis_handle) = match synthesizer {
        Some(provider) => {
            let coordinator = VoiceSynthesisCoordinator::new(
                provider,
                CoordinatorSettings::from(&config.synthesis),
            );
            let (host, handle) = SynthesisHost::start(coordinator);
            (Some(host), Some(handle))
        }
        None => {
            tracing::warn!("speech synthesis unsupported, replies will only be printed");
            (None, None)
        }
    };

    let transport =
        HttpChatTransport::new(&config.chat).context("failed to build chat transport")?;
    tracing::info!("chat endpoint: {}", transport.endpoint());

    // kept so an interrupt can silence playback after the pipeline is gone
    let interrupt_handle = synthesis_handle.clone();
    let pipeline = ConversationPipeline::new(
        Arc::new(transport),
        synthesis_handle,
        PipelineSettings::from_config(&config.chat, &config.conversation),
    );
    let render_task = tokio::spawn(render(pipeline.subscribe()));
    let (transcript_tx, transcript_rx) = mpsc::unbounded_channel();
    let pipeline_task = pipeline.spawn(transcript_rx);

    tracing::info!("listening: type a line per utterance, Ctrl-D to finish");

    let interrupted = tokio::select! {
        _ = converse(&mut session, &transcript_tx) => false,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            true
        }
    };

    tracing::info!("shutting down");
    session.stop();
    drop(transcript_tx);

    if interrupted {
        pipeline_task.abort();
    }
    match pipeline_task.await {
        Ok(final_state) => {
            tracing::info!(messages = final_state.messages.len(), "conversation ended");
        }
        Err(e) if e.is_cancelled() => tracing::debug!("conversation task cancelled"),
        Err(e) => return Err(e).context("conversation task failed"),
    }
    let _ = render_task.await;

    if let Some(handle) = interrupt_handle {
        if interrupted {
            handle.cancel();
        }
    }
    if let Some(mut host) = synthesis_host {
        host.shutdown().await;
    }

    Ok(())
}

/// Run recognition attempts back to back, forwarding every transcript.
async fn converse(
    session: &mut VoiceSession,
    transcripts: &mpsc::UnboundedSender<ResolvedTranscript>,
) {
    loop {
        match session.start() {
            SessionUpdate::Started => {}
            SessionUpdate::Unsupported => {
                tracing::error!("speech recognition unsupported, nothing to listen to");
                return;
            }
            other => {
                tracing::error!(?other, "could not start listening");
                return;
            }
        }

        while session.state() == SessionState::Listening {
            let Some(update) = session.next_update().await else {
                return;
            };
            match update {
                SessionUpdate::Interim(text) => tracing::debug!("heard so far: {text}"),
                SessionUpdate::Transcript(transcript) => {
                    if transcripts.send(transcript).is_err() {
                        return;
                    }
                }
                SessionUpdate::Failed { code } if code == INPUT_CLOSED => return,
                _ => {}
            }
        }
    }
}

/// Print messages as they are appended to the conversation.
async fn render(mut state_rx: watch::Receiver<ConversationState>) {
    let mut shown = 0;
    while state_rx.changed().await.is_ok() {
        let state = state_rx.borrow_and_update().clone();
        for message in state.messages.iter().skip(shown) {
            let author = match message.author {
                Author::User => "you",
                Author::Assistant => "assistant",
            };
            println!("[{}] {author}: {}", message.sequence, message.text);
        }
        if state.messages.len() > shown {
            if let Some(error) = &state.last_error {
                println!("    ({error})");
            }
        }
        shown = state.messages.len();
    }
}
