use crate::provider::RecognitionProvider;
use std::collections::HashMap;
use voxtalk_core::RecognitionError;

/// Name reserved for "no recognition capability".
pub const NO_PROVIDER: &str = "none";

pub struct RecognizerRegistry {
    factories: HashMap<String, fn() -> Box<dyn RecognitionProvider>>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("console", || {
            Box::new(crate::console::ConsoleRecognizer::new())
        });
        registry.register("scripted", || {
            Box::new(crate::scripted::ScriptedRecognizer::default())
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn RecognitionProvider>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn RecognitionProvider>, RecognitionError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| RecognitionError::ProviderNotFound(name.to_string()))
    }

    /// Like [`create`](Self::create), but maps [`NO_PROVIDER`] to `None`.
    pub fn create_optional(
        &self,
        name: &str,
    ) -> Result<Option<Box<dyn RecognitionProvider>>, RecognitionError> {
        if name == NO_PROVIDER {
            return Ok(None);
        }
        self.create(name).map(Some)
    }

    pub fn list_providers(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
