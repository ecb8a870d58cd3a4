//! Web search capability for the deepagent CLI.
//!
//! The application only depends on the [`ports::WebSearch`] contract. The
//! Tavily-backed implementation lives in [`tavily`] and is the single place
//! where the provider's wire format and failure modes are handled; above it
//! only [`SearchError`] exists. [`tool`] exposes the capability to the agent
//! runtime as the `web_search` tool.

pub mod error;
pub mod ports;
pub mod tavily;
pub mod tool;

pub use error::SearchError;
pub use ports::{SearchResult, WebSearch, DEFAULT_MAX_RESULTS};
pub use tavily::TavilySearch;
pub use tool::web_search_tool;
