use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use voxtalk_core::config::ChatConfig;
use voxtalk_core::{ConversationMessage, TransportError};

/// Body posted to the chat endpoint. Optional fields are omitted, not nulled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ConversationMessage>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    pub message: String,
}

/// Request/response exchange with the assistant backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// JSON-over-HTTP transport: one POST per turn.
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatTransport {
    pub fn new(config: &ChatConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxtalk_core::Author;

    #[test]
    fn test_request_omits_unset_fields() {
        let request = ChatRequest {
            message: "Hello".to_string(),
            model: None,
            context: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Hello" }));
    }

    #[test]
    fn test_request_serializes_model_and_context() {
        let request = ChatRequest {
            message: "And tomorrow".to_string(),
            model: Some("small".to_string()),
            context: Some(vec![ConversationMessage {
                text: "Weather today".to_string(),
                author: Author::User,
                sequence: 1,
            }]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "small");
        assert_eq!(json["context"][0]["author"], "user");
        assert_eq!(json["context"][0]["sequence"], 1);
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"message":"Hi there","model":"small"}"#).unwrap();
        assert_eq!(response.message, "Hi there");
    }

    #[test]
    fn test_http_transport_keeps_endpoint() {
        let config = ChatConfig {
            endpoint: "http://localhost:9999/chat".to_string(),
            ..ChatConfig::default()
        };
        let transport = HttpChatTransport::new(&config).unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:9999/chat");
    }
}
