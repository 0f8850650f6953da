use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("recognition provider failed to start: {0}")]
    StartFailed(String),

    #[error("recognition provider not found: {0}")]
    ProviderNotFound(String),
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    #[error("synthesis provider not found: {0}")]
    ProviderNotFound(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat request failed: {0}")]
    Request(String),

    #[error("chat endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid chat response: {0}")]
    InvalidResponse(String),
}
