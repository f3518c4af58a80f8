//! HttpAssistantGateway - REST implementation of the assistant gateway.
//!
//! Posts `{message, conversation_history}` to a single endpoint and expects
//! `{response}` back. One request per call, no retries.

use async_trait::async_trait;
use penguin_core::chat::HistoryEntry;
use penguin_core::gateway::{AssistantGateway, AssistantReply, GatewayError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gateway implementation that talks to an HTTP chat endpoint.
#[derive(Clone)]
pub struct HttpAssistantGateway {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAssistantGateway {
    /// Creates a gateway for `endpoint` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    /// Sends `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_request(&self, body: &ChatRequest<'_>) -> Result<String, GatewayError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                GatewayError::timeout(err.to_string())
            } else {
                GatewayError::transport(format!("assistant request failed: {err}"))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::decode(format!("failed to parse assistant response: {err}")))?;

        Ok(parsed.response)
    }
}

#[async_trait]
impl AssistantGateway for HttpAssistantGateway {
    async fn ask(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<AssistantReply, GatewayError> {
        let request = ChatRequest::new(message, history);
        tracing::debug!(
            endpoint = %self.endpoint,
            history_len = history.len(),
            "Sending assistant request"
        );

        let response = self.send_request(&request).await?;
        Ok(AssistantReply { response })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    conversation_history: Vec<WireHistoryEntry<'a>>,
}

impl<'a> ChatRequest<'a> {
    fn new(message: &'a str, history: &'a [HistoryEntry]) -> Self {
        Self {
            message,
            conversation_history: history
                .iter()
                .map(|entry| WireHistoryEntry {
                    role: entry.role.as_str(),
                    content: &entry.content,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct WireHistoryEntry<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn map_http_error(status: StatusCode, body: String) -> GatewayError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error)
        .unwrap_or(body);

    GatewayError::Status {
        code: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penguin_core::chat::MessageRole;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let history = vec![
            HistoryEntry {
                role: MessageRole::Assistant,
                content: "Hello!".to_string(),
            },
            HistoryEntry {
                role: MessageRole::User,
                content: "2+2?".to_string(),
            },
            HistoryEntry {
                role: MessageRole::Assistant,
                content: "4".to_string(),
            },
        ];

        let value = serde_json::to_value(ChatRequest::new("and 3+3?", &history)).unwrap();
        assert_eq!(
            value,
            json!({
                "message": "and 3+3?",
                "conversation_history": [
                    {"role": "assistant", "content": "Hello!"},
                    {"role": "user", "content": "2+2?"},
                    {"role": "assistant", "content": "4"},
                ]
            })
        );
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert_eq!(parsed.response, "hi");
    }

    #[test]
    fn test_map_http_error_extracts_json_message() {
        let err = map_http_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"model overloaded"}"#.to_string(),
        );
        assert_eq!(
            err,
            GatewayError::Status {
                code: 500,
                message: "model overloaded".to_string(),
            }
        );
    }

    #[test]
    fn test_map_http_error_keeps_plain_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(
            err,
            GatewayError::Status {
                code: 502,
                message: "upstream down".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let gateway =
            HttpAssistantGateway::new("http://127.0.0.1:9/chat", Duration::from_secs(2)).unwrap();
        let err = gateway.ask("hello", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Transport(_) | GatewayError::Timeout(_)
        ));
    }
}
