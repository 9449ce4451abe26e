use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, warn};

use super::html::page_text;

pub const FETCH_USER_AGENT: &str = "Mozilla/5.0 (compatible; MNVScorecard/1.0)";

/// Plain text recovered from a remote document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedText {
    pub text: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("URL is required")]
    MissingUrl,
    #[error("URL must be an absolute http or https address")]
    InvalidUrl,
    #[error("Failed to fetch URL: {reason}")]
    Upstream { status: u16, reason: String },
    #[error("Failed to fetch: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Fetches a page so its text can be pasted into an evaluation.
#[derive(Debug, Clone)]
pub struct UrlTextFetcher {
    client: reqwest::Client,
}

impl UrlTextFetcher {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::Transport)?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedText, SourceError> {
        let url = parse_url(raw_url)?;

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, FETCH_USER_AGENT)
            .header(ACCEPT, accept_header())
            .send()
            .await
            .map_err(|err| {
                warn!(%url, error = %err, "source fetch failed");
                SourceError::Transport(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "source returned an error status");
            return Err(SourceError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await.map_err(SourceError::Transport)?;
        let text = page_text(&body);

        debug!(%url, content_type = %content_type, chars = text.chars().count(), "source text extracted");
        Ok(FetchedText { text, content_type })
    }
}

fn parse_url(raw_url: &str) -> Result<Url, SourceError> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(SourceError::MissingUrl);
    }

    let url = Url::parse(trimmed).map_err(|_| SourceError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(SourceError::InvalidUrl),
    }
}

fn accept_header() -> String {
    [
        mime::TEXT_HTML.essence_str(),
        "application/xhtml+xml",
        mime::TEXT_PLAIN.essence_str(),
        mime::APPLICATION_PDF.essence_str(),
    ]
    .join(",")
}
