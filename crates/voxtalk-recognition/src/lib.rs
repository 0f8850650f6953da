pub mod console;
pub mod provider;
pub mod registry;
pub mod scripted;
pub mod session;

pub use console::ConsoleRecognizer;
pub use provider::{ProviderEvent, RecognitionProvider, RecognitionSettings};
pub use registry::RecognizerRegistry;
pub use scripted::{ScriptCounters, ScriptedRecognizer};
pub use session::{SessionInput, SessionState, SessionUpdate, VoiceSession};
