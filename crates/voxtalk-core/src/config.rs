use crate::error::ConfigError;
use crate::transcript::DEFAULT_CONFIDENCE_THRESHOLD;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub recognition: RecognitionConfig,

    #[serde(default)]
    pub synthesis: SynthesisConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecognitionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub continuous: bool,

    #[serde(default = "default_true")]
    pub interim_results: bool,

    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: u32,

    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            language: default_language(),
            continuous: false,
            interim_results: default_true(),
            max_alternatives: default_max_alternatives(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SynthesisConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Seconds between pause/resume nudges while an utterance is playing.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    #[serde(default = "default_quality_markers")]
    pub quality_markers: Vec<String>,

    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,

    /// Upper bound on letting the last utterance finish during shutdown.
    #[serde(default = "default_drain_secs")]
    pub drain_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            keep_alive_secs: default_keep_alive_secs(),
            quality_markers: default_quality_markers(),
            words_per_minute: default_words_per_minute(),
            drain_secs: default_drain_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub model: Option<String>,

    /// Send prior messages as `context` with every request.
    #[serde(default)]
    pub include_history: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: None,
            include_history: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConversationConfig {
    /// Read the synthetic error entry aloud after a failed request.
    #[serde(default)]
    pub speak_errors: bool,

    #[serde(default = "default_error_message")]
    pub error_message: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            speak_errors: false,
            error_message: default_error_message(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider() -> String {
    "console".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_alternatives() -> u32 {
    5
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_keep_alive_secs() -> u64 {
    14
}

fn default_drain_secs() -> u64 {
    30
}

pub fn default_quality_markers() -> Vec<String> {
    [
        "Enhanced", "Premium", "Neural", "Natural", "Samantha", "Alex", "Daniel", "Google",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_words_per_minute() -> u32 {
    180
}

fn default_endpoint() -> String {
    "http://localhost:8000/api/chat".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_error_message() -> String {
    "Sorry, I couldn't reach the assistant. Please try again.".to_string()
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let val = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &val);
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.recognition.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "recognition.confidence_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.recognition.max_alternatives == 0 {
            return Err(ConfigError::Invalid(
                "recognition.max_alternatives must be at least 1".to_string(),
            ));
        }
        if self.synthesis.keep_alive_secs == 0 {
            return Err(ConfigError::Invalid(
                "synthesis.keep_alive_secs must be greater than 0".to_string(),
            ));
        }
        if self.chat.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("chat.endpoint must not be empty".to_string()));
        }
        Ok(())
    }
}
