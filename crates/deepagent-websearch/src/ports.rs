//! Capability contracts the application layer depends on.
//!
//! Concrete providers (e.g. Tavily) implement these in their own modules so
//! callers never touch provider-specific types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Result count hint applied when the caller does not pass one.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// One normalized web search hit.
///
/// `title` and `url` are always present (empty when the provider omitted
/// them). `content` stays `None` when the provider supplied none, keeping
/// "unknown" distinct from "empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: Option<String>,
}

/// Contract for web search.
///
/// `max_results` is a hint, not a guarantee; implementations may return
/// fewer. Zero results is `Ok(vec![])` — a failed search is always an `Err`,
/// never an empty list in disguise. Results keep the provider's relevance
/// order.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;
}
