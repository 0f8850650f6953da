use crate::provider::SynthesisProvider;
use std::collections::HashMap;
use voxtalk_core::config::SynthesisConfig;
use voxtalk_core::SynthesisError;

/// Name reserved for "no synthesis capability".
pub const NO_PROVIDER: &str = "none";

type Factory = fn(&SynthesisConfig) -> Box<dyn SynthesisProvider>;

pub struct SynthesizerRegistry {
    factories: HashMap<String, Factory>,
}

impl SynthesizerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("console", |config| {
            Box::new(crate::console::ConsoleSynthesizer::new(config.words_per_minute))
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: Factory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(
        &self,
        name: &str,
        config: &SynthesisConfig,
    ) -> Result<Box<dyn SynthesisProvider>, SynthesisError> {
        self.factories
            .get(name)
            .map(|f| f(config))
            .ok_or_else(|| SynthesisError::ProviderNotFound(name.to_string()))
    }

    /// Like [`create`](Self::create), but maps [`NO_PROVIDER`] to `None`.
    pub fn create_optional(
        &self,
        name: &str,
        config: &SynthesisConfig,
    ) -> Result<Option<Box<dyn SynthesisProvider>>, SynthesisError> {
        if name == NO_PROVIDER {
            return Ok(None);
        }
        self.create(name, config).map(Some)
    }

    pub fn list_providers(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for SynthesizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
