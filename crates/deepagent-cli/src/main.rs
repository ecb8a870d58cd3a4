//! deepagent — interactive deep-agent chat with web search.
//!
//! Composition root: builds the model client, the search adapter and its
//! tool, the checkpointer and the on-disk file mirror, then drives a
//! read-eval-print loop against the deep agent runtime.

mod files;

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use agents_core::llm::LanguageModel;
use agents_core::persistence::{Checkpointer, InMemoryCheckpointer, ThreadId};
use agents_core::state::AgentStateSnapshot;
use agents_runtime::{ConfigurableAgentBuilder, OpenAiChatModel, OpenAiConfig};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use deepagent_websearch::{web_search_tool, TavilySearch};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const INSTRUCTIONS: &str = "\
You are a helpful research assistant.

Planning:
- For complex tasks, break the work down with the write_todos tool and keep it updated as you go.

Tools:
- Use web_search when you need current information, and cite the URLs you relied on.
- When a tool returns a large payload, store it in a file with write_file and keep your reply concise.

Files:
- When the user asks you to save or create a file, use write_file with an absolute path starting \
with '/' (for example /report.md). Files are mirrored into the session data directory on disk.
- If the user asks to save somewhere else on their machine, explain that you can only write inside \
the session data directory, and save there.";

#[derive(Parser, Debug)]
#[command(name = "deepagent", version)]
#[command(about = "Interactive deep agent with web search and a per-session file store")]
struct Args {
    /// Chat model name (any OpenAI-compatible chat model).
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// OpenAI-compatible endpoint override.
    #[arg(long)]
    api_url: Option<String>,

    /// Session thread id; defaults to a fresh UUID per run.
    #[arg(long)]
    thread_id: Option<String>,

    /// Directory where files written by the agent are mirrored.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Disable colored terminal output.
    #[arg(long)]
    no_color: bool,

    /// Start without the web_search tool even when TAVILY_API_KEY is set.
    #[arg(long)]
    disable_web_search: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_key = env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow::anyhow!("Missing env var: OPENAI_API_KEY"))?;
    let model: Arc<dyn LanguageModel> = Arc::new(OpenAiChatModel::new(OpenAiConfig {
        api_key,
        model: args.model.clone(),
        api_url: args.api_url.clone(),
        custom_headers: Vec::new(),
    })?);

    let mut builder = ConfigurableAgentBuilder::new(INSTRUCTIONS).with_model(model);

    // A missing or broken search credential must not take the whole agent
    // down; the session continues without the tool.
    if args.disable_web_search {
        tracing::info!("web search disabled by flag");
    } else {
        match TavilySearch::from_env() {
            Ok(adapter) => {
                builder = builder.with_tool(web_search_tool(Arc::new(adapter)));
                tracing::info!("web_search tool registered");
            }
            Err(err) => {
                println!(
                    "{}",
                    format!("Warning: web search disabled ({err}).").yellow()
                );
            }
        }
    }

    let checkpointer = Arc::new(InMemoryCheckpointer::new());
    let agent = builder.with_checkpointer(checkpointer.clone()).build()?;

    let thread_id: ThreadId = args
        .thread_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    fs::create_dir_all(&args.data_dir).with_context(|| {
        format!("failed to create data directory {}", args.data_dir.display())
    })?;

    println!("{}", format!("=== DEEP AGENT ({}) ===", args.model).green());
    println!("{}", format!("Session: {thread_id}").blue());
    println!(
        "{}",
        format!("Agent files are mirrored to: {}", args.data_dir.display()).yellow()
    );
    println!("Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("{}", ">>> ".blue());
        io::stdout().flush().ok();
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        println!("{}", "Processing...".magenta());
        match agent
            .handle_message(line, Arc::new(AgentStateSnapshot::default()))
            .await
        {
            Ok(reply) => {
                let text = match reply.content.as_text() {
                    Some(text) => text.to_string(),
                    None => reply
                        .content
                        .as_json()
                        .map(|value| value.to_string())
                        .unwrap_or_default(),
                };
                if !text.is_empty() {
                    println!("{}", "=== Final Answer ===".green());
                    println!("{}", "-".repeat(50));
                    println!("{text}");
                    println!("{}", "-".repeat(50));
                }
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:#}").red());
                continue;
            }
        }

        agent.save_state(&thread_id).await?;
        if let Some(state) = checkpointer.load_state(&thread_id).await? {
            if let Err(err) = files::mirror(&args.data_dir, &state.files) {
                tracing::warn!(error = %err, "failed to mirror agent files to disk");
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}
