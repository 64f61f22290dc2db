//! OpenAI-compatible chat-completions client

use async_trait::async_trait;
use reqwest::Client;

use super::config::ClientConfig;
use super::error::ClientError;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse};

/// Anything that can answer a chat-completions request
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send one request and decode the reply
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError>;

    /// Model used when a request does not name one
    fn default_model(&self) -> &str;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct ChatClient {
    http_client: Client,
    config: ClientConfig,
}

impl ChatClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.api_key.is_empty() {
            return Err(ClientError::Configuration("API key is empty".to_string()));
        }

        let http_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ClientError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create a client configured from the environment
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl ChatProvider for ChatClient {
    async fn complete(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        if request.model.is_empty() {
            request.model = self.config.model.clone();
        }
        tracing::debug!(model = %request.model, messages = request.messages.len(), "sending chat completion request");

        let response = self
            .http_client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "received chat completion response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }
}
