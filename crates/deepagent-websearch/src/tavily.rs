//! Tavily-backed implementation of the [`WebSearch`] port.
//!
//! Keeps the provider's wire format and error surface out of the rest of the
//! application: HTTP failures are folded into [`SearchError`] and response
//! bodies are normalized defensively, so a provider schema change in optional
//! fields never turns into a crash.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::SearchError;
use crate::ports::{SearchResult, WebSearch};

/// Environment variable the API key is resolved from when none is passed.
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

const DEFAULT_ENDPOINT: &str = "https://api.tavily.com/search";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct TavilySearch {
    client: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl TavilySearch {
    /// Builds an adapter with an explicit API key.
    ///
    /// Fails here rather than on the first search call: callers that cannot
    /// provide a credential should find out before the conversation starts.
    pub fn new(api_key: impl Into<String>) -> Result<Self, SearchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SearchError::configuration(format!(
                "Tavily API key is not configured. Set {TAVILY_API_KEY_ENV}."
            )));
        }
        let client = Client::builder()
            .user_agent(concat!("deepagent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| {
                SearchError::with_source("Failed to build the HTTP client for Tavily.", err)
            })?;
        Ok(Self {
            client,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Builds an adapter from the `TAVILY_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key = std::env::var(TAVILY_API_KEY_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                SearchError::configuration(format!(
                    "Tavily API key is not configured. Set {TAVILY_API_KEY_ENV}."
                ))
            })?;
        Self::new(api_key)
    }

    /// Overrides the search endpoint (self-hosted proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Request body with the fixed sub-policy: basic depth, no answer synthesis,
/// no raw content, no images. Always the minimal normalized payload.
#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
    include_raw_content: bool,
    include_images: bool,
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let body = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
            search_depth: "basic",
            include_answer: false,
            include_raw_content: false,
            include_images: false,
        };

        tracing::debug!(query = %query, max_results, "querying Tavily");
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &detail));
        }

        let payload: Value = response.json().await.map_err(|err| {
            SearchError::with_source("Unexpected error while querying Tavily.", err)
        })?;
        let results = normalize_results(&payload);
        tracing::debug!(count = results.len(), "Tavily search completed");
        Ok(results)
    }
}

/// Upstream response detail attached as the error cause.
#[derive(Debug, Error)]
#[error("HTTP {status}: {detail}")]
struct UpstreamResponse {
    status: u16,
    detail: String,
}

fn classify_transport(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::with_source("Timed out waiting for Tavily.", err)
    } else {
        SearchError::with_source("Unexpected error while querying Tavily.", err)
    }
}

fn classify_status(status: StatusCode, body: &str) -> SearchError {
    let message = match status {
        StatusCode::UNAUTHORIZED => "Tavily API key is invalid. Check TAVILY_API_KEY.",
        StatusCode::TOO_MANY_REQUESTS => "Tavily usage limit exceeded. Check your plan and quotas.",
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            "Invalid request parameters for Tavily search."
        }
        StatusCode::FORBIDDEN => "Access denied by Tavily for this request.",
        _ => "Unexpected error while querying Tavily.",
    };
    SearchError::with_source(
        message,
        UpstreamResponse {
            status: status.as_u16(),
            detail: upstream_detail(status, body),
        },
    )
}

/// Best-effort extraction of the provider's own error message.
fn upstream_detail(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/detail/error")
                .or_else(|| json.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("no response body").to_string())
}

/// Pulls the `results` list out of the response body.
///
/// A body that is not a mapping, or has no well-formed `results` list, is
/// "no results", not a failure. Non-conforming hits are skipped so one bad
/// record cannot void the rest of the batch.
fn normalize_results(payload: &Value) -> Vec<SearchResult> {
    let Some(items) = payload.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };
    items.iter().filter_map(normalize_hit).collect()
}

fn normalize_hit(item: &Value) -> Option<SearchResult> {
    let hit = item.as_object()?;
    Some(SearchResult {
        title: lossy_string(hit.get("title")),
        url: lossy_string(hit.get("url")),
        content: optional_string(hit.get("content")),
    })
}

/// Absent and null collapse to `""`; other scalars are stringified.
fn lossy_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Absent and null stay `None`; other scalars are stringified.
fn optional_string(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error;

    #[test]
    fn normalizes_conforming_hits_in_order() {
        let payload = json!({
            "results": [
                {"title": "A", "url": "http://a", "content": "x"},
                {"title": "B", "url": "http://b", "content": null},
            ]
        });
        let results = normalize_results(&payload);
        assert_eq!(
            results,
            vec![
                SearchResult {
                    title: "A".into(),
                    url: "http://a".into(),
                    content: Some("x".into()),
                },
                SearchResult {
                    title: "B".into(),
                    url: "http://b".into(),
                    content: None,
                },
            ]
        );
    }

    #[test]
    fn skips_non_conforming_hits_without_failing_the_batch() {
        let payload = json!({
            "results": [
                {"title": "A", "url": "http://a", "content": "x"},
                {"title": "B", "url": "http://b", "content": null},
                "not-a-dict",
            ]
        });
        let results = normalize_results(&payload);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "A");
        assert_eq!(results[1].title, "B");
        assert_eq!(results[1].content, None);
    }

    #[test]
    fn missing_results_key_means_no_results() {
        assert!(normalize_results(&json!({"answer": "42"})).is_empty());
    }

    #[test]
    fn non_mapping_payload_means_no_results() {
        assert!(normalize_results(&json!(["a", "b"])).is_empty());
        assert!(normalize_results(&json!("oops")).is_empty());
        assert!(normalize_results(&json!({"results": "not-a-list"})).is_empty());
    }

    #[test]
    fn absent_and_null_fields_default_without_losing_the_content_distinction() {
        let payload = json!({"results": [{"url": "http://a", "title": null}]});
        let results = normalize_results(&payload);
        assert_eq!(results[0].title, "");
        assert_eq!(results[0].url, "http://a");
        assert_eq!(results[0].content, None);
    }

    #[test]
    fn non_string_scalars_are_stringified() {
        let payload = json!({"results": [{"title": 42, "url": "http://a", "content": 7}]});
        let results = normalize_results(&payload);
        assert_eq!(results[0].title, "42");
        assert_eq!(results[0].content.as_deref(), Some("7"));
    }

    #[test]
    fn status_codes_map_to_the_taxonomy() {
        let cases = [
            (StatusCode::UNAUTHORIZED, "invalid"),
            (StatusCode::TOO_MANY_REQUESTS, "usage limit"),
            (StatusCode::BAD_REQUEST, "Invalid request parameters"),
            (StatusCode::UNPROCESSABLE_ENTITY, "Invalid request parameters"),
            (StatusCode::FORBIDDEN, "Access denied"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error"),
        ];
        for (status, needle) in cases {
            let err = classify_status(status, "");
            assert!(
                err.to_string().contains(needle),
                "{status}: {err} should mention {needle:?}"
            );
        }
    }

    #[test]
    fn upstream_detail_survives_as_the_error_cause() {
        let err = classify_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": {"error": "Unauthorized: missing or invalid API key."}}"#,
        );
        let cause = err.source().expect("cause must be preserved");
        assert!(cause.to_string().contains("missing or invalid API key"));
        assert!(cause.to_string().contains("401"));
    }

    #[test]
    fn plain_text_bodies_are_kept_verbatim_as_detail() {
        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded\n");
        let cause = err.source().unwrap();
        assert!(cause.to_string().contains("upstream exploded"));
    }

    #[test]
    fn empty_key_fails_at_construction() {
        let err = TavilySearch::new("   ").expect_err("blank key must be rejected");
        assert!(err.to_string().contains("TAVILY_API_KEY"));
    }
}
