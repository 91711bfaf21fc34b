use reqwest::Client as HttpClient;

use crate::models::{ChatRequest, ChatResponse, ErrorBody};

/// Fallback when the relay rejects a prompt without saying why
pub const RELAY_UNAVAILABLE: &str = "Service unavailable";

/// Why a relay exchange produced no answer
///
/// Carries only strings meant for display; transport details are logged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The relay answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No response came back at all
    #[error("Could not reach the chat service")]
    Unreachable,
}

/// Single-turn prompt relay as seen from the browsing side
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChatRelay: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String, RelayError>;
}

/// Client for the chat relay's single-turn `POST /api/chat`
///
/// One request per prompt: no streaming, no retry.
#[derive(Clone)]
pub struct RelayClient {
    http_client: HttpClient,
    chat_url: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            chat_url: format!("{}/api/chat", relay_url.trim_end_matches('/')),
        }
    }
}

#[async_trait::async_trait]
impl ChatRelay for RelayClient {
    async fn send(&self, prompt: &str) -> Result<String, RelayError> {
        let body = ChatRequest {
            prompt: Some(prompt.to_string()),
        };

        let response = self
            .http_client
            .post(&self.chat_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %self.chat_url, "Error calling chat relay");
                RelayError::Unreachable
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| RELAY_UNAVAILABLE.to_string());
            tracing::warn!(status = %status, message = %message, "Chat relay rejected prompt");
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<ChatResponse>().await {
            Ok(body) => Ok(body.response),
            Err(e) => {
                tracing::error!(error = %e, "Chat relay sent an unreadable reply");
                Err(RelayError::Rejected {
                    status: status.as_u16(),
                    message: RELAY_UNAVAILABLE.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_joins_cleanly() {
        let client = RelayClient::new("http://localhost:5050/");
        assert_eq!(client.chat_url, "http://localhost:5050/api/chat");
    }

    #[test]
    fn test_rejected_displays_only_message() {
        let err = RelayError::Rejected {
            status: 400,
            message: "Prompt is required".to_string(),
        };
        assert_eq!(err.to_string(), "Prompt is required");
    }

    #[tokio::test]
    async fn test_unreachable_relay() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RelayClient::new(&format!("http://{}", addr));
        assert_eq!(client.send("hello").await, Err(RelayError::Unreachable));
    }
}
