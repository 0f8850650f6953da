pub mod console;
pub mod coordinator;
pub mod host;
pub mod provider;
pub mod registry;
pub mod voice;

pub use console::ConsoleSynthesizer;
pub use coordinator::{CoordinatorSettings, PlaybackUpdate, VoiceSynthesisCoordinator};
pub use host::{SynthesisCommand, SynthesisHandle, SynthesisHost};
pub use provider::{SynthesisEvent, SynthesisProvider, Utterance};
pub use registry::SynthesizerRegistry;
pub use voice::select_voice;
