//! Pulls the readable text out of a web page so it can be evaluated.

mod fetcher;
mod html;

pub use fetcher::{FetchedText, SourceError, UrlTextFetcher, FETCH_USER_AGENT};
pub use html::{page_text, MAX_TEXT_CHARS};

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::workflows::intake::method_not_allowed;

pub const FETCH_URL_ROUTE: &str = "/api/fetch-url";

/// Request body `{ "url": "..." }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlSubmission {
    #[serde(default)]
    pub url: Option<Value>,
}

pub fn source_router(fetcher: Arc<UrlTextFetcher>) -> Router {
    Router::new()
        .route(
            FETCH_URL_ROUTE,
            post(fetch_url_handler).fallback(method_not_allowed),
        )
        .with_state(fetcher)
}

async fn fetch_url_handler(
    State(fetcher): State<Arc<UrlTextFetcher>>,
    payload: Result<Json<UrlSubmission>, JsonRejection>,
) -> Result<Response, AppError> {
    let url = payload
        .ok()
        .and_then(|Json(submission)| submission.url)
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();

    let fetched = fetcher.fetch(&url).await?;
    Ok((StatusCode::OK, Json(fetched)).into_response())
}
