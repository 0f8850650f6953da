pub mod pipeline;
pub mod transport;

pub use pipeline::{ConversationPipeline, PipelineSettings};
pub use transport::{ChatRequest, ChatResponse, ChatTransport, HttpChatTransport};
