use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ModelGateway, ModelRequest, ProviderError, ProviderReply};
use crate::config::ProviderConfig;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API client. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct AnthropicGateway {
    client: reqwest::Client,
    api_key: Option<String>,
    messages_url: String,
    model: String,
}

impl AnthropicGateway {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ProviderError::Config(format!("unable to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            messages_url: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [ApiMessage<'a>; 1],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[async_trait]
impl ModelGateway for AnthropicGateway {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: ModelRequest) -> Result<ProviderReply, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;

        let payload = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: [ApiMessage {
                role: "user",
                content: &request.user_content,
            }],
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.messages_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "provider request failed");
                ProviderError::Transport(err)
            })?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|source| ProviderError::Decode { status, source })?;

        debug!(
            status,
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "provider call completed"
        );

        Ok(ProviderReply { status, body })
    }
}
