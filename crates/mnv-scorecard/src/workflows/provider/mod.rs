//! Outbound calls to the language model provider.

mod anthropic;

pub use anthropic::{AnthropicGateway, ANTHROPIC_VERSION};

use async_trait::async_trait;
use serde_json::Value;

/// One system-prompted completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub system: String,
    pub user_content: String,
    pub max_tokens: u32,
}

/// The provider's status and JSON body, forwarded to callers as-is unless a
/// workflow rewrites the text payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    pub status: u16,
    pub body: Value,
}

impl ProviderReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the workflows and the network so handlers can be exercised
/// with in-memory fakes.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// `false` when no credential is available; workflows check this before
    /// validating input.
    fn is_configured(&self) -> bool {
        true
    }

    /// Single attempt, no retry.
    async fn complete(&self, request: ModelRequest) -> Result<ProviderReply, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("ANTHROPIC_API_KEY not configured")]
    MissingCredential,
    #[error("invalid provider configuration: {0}")]
    Config(String),
    #[error("provider request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("provider returned an unreadable body (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderError {
    /// Message shown to API callers. Transport details stay in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            ProviderError::MissingCredential => "ANTHROPIC_API_KEY not configured",
            ProviderError::Config(_) => "Provider is not configured correctly",
            ProviderError::Transport(_) | ProviderError::Decode { .. } => {
                "API request failed. Please try again."
            }
        }
    }
}
