//! Exposes the [`WebSearch`] port to the agent runtime as the `web_search`
//! tool.
//!
//! This is the only place the domain result is re-flattened into the generic
//! `{title, url, content}` records the runtime passes back to the model.

use std::collections::HashMap;
use std::sync::Arc;

use agents_core::tools::{ToolBox, ToolContext, ToolParameterSchema, ToolResult};
use agents_toolkit::ToolBuilder;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ports::{WebSearch, DEFAULT_MAX_RESULTS};

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

/// Builds the `web_search` tool around any [`WebSearch`] implementation.
pub fn web_search_tool(search: Arc<dyn WebSearch>) -> ToolBox {
    let mut properties = HashMap::new();
    properties.insert(
        "query".to_string(),
        ToolParameterSchema::string("Search term or question"),
    );
    properties.insert(
        "max_results".to_string(),
        ToolParameterSchema::integer("Maximum number of results (default: 5)"),
    );

    ToolBuilder::new(
        "web_search",
        "Search the web. Returns results with `title`, `url` and `content` (when available). \
         An empty list means the search ran but found nothing.",
    )
    .with_parameters(ToolParameterSchema::object(
        "Web search parameters",
        properties,
        vec!["query".to_string()],
    ))
    .build_async(move |args, ctx| run_search(search.clone(), args, ctx))
}

async fn run_search(
    search: Arc<dyn WebSearch>,
    args: Value,
    ctx: ToolContext,
) -> anyhow::Result<ToolResult> {
    let args: WebSearchArgs = serde_json::from_value(args)?;
    let max_results = args.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    tracing::info!(tool = "web_search", query = %args.query, max_results, "running web search");

    let results = search.search(&args.query, max_results).await?;
    let records: Vec<Value> = results
        .iter()
        .map(|item| {
            json!({
                "title": item.title,
                "url": item.url,
                "content": item.content,
            })
        })
        .collect();

    Ok(ToolResult::json(&ctx, Value::Array(records)))
}
