mod agent;
mod app;
mod cache;
mod commands;
mod config;
mod error;
mod event;
mod filter;
mod jira;
mod llm;
mod logging;
mod resolve;
mod sprints;
mod tools;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::Orchestrator;
use crate::cache::FactCache;
use crate::config::Config;
use crate::jira::{JiraBackend, JiraClient};
use crate::llm::OpenAiCompatClient;
use crate::tools::ToolExecutor;

#[derive(Parser, Debug)]
#[command(name = "pmbot")]
#[command(about = "Ask questions about your Jira sprints in plain language")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/pmbot/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Jira board id to work against
  #[arg(short, long)]
  board: Option<u64>,

  /// Jira project key new issues are created in
  #[arg(short, long)]
  project: Option<String>,

  /// Stream the final answer token by token
  #[arg(long)]
  stream: bool,

  #[command(subcommand)]
  command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Ask a single question and exit
  Ask {
    #[arg(required = true)]
    question: Vec<String>,
  },
  /// Run one tool directly and print its JSON result
  Tool {
    /// prepare_search, get_sprint_issues, get_issue or create_issue
    name: String,
    /// Tool arguments as a JSON object
    #[arg(default_value = "{}")]
    arguments: String,
  },
  /// Re-fetch sprints, statuses and team members
  Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration, command line wins
  let mut config = Config::load(args.config.as_deref())?;
  if let Some(board) = args.board {
    config.jira.board_id = Some(board);
  }
  if let Some(project) = args.project {
    config.jira.project_key = Some(project);
  }

  let _log_guard = logging::init()?;
  tracing::info!(board_id = ?config.jira.board_id, url = %config.jira.url, "starting pmbot");

  let backend: Arc<dyn JiraBackend> = Arc::new(JiraClient::new(&config)?);
  let cache = Arc::new(FactCache::new(
    backend.clone(),
    config.jira.board_id,
    config.cache_ttl()?,
  ));
  let tools = Arc::new(ToolExecutor::new(backend, cache.clone(), config.jira.clone()));

  match args.command {
    Some(Cmd::Tool { name, arguments }) => {
      let arguments: serde_json::Value = serde_json::from_str(&arguments)
        .map_err(|e| eyre!("Tool arguments must be JSON: {}", e))?;
      let output = tools.execute_raw(&name, arguments).await?;
      println!("{}", serde_json::to_string_pretty(&output.to_json())?);
    }
    Some(Cmd::Refresh) => {
      let facts = cache.force_refresh().await?;
      println!(
        "Cached {} sprints, {} statuses and {} team members.",
        facts.sprints.len(),
        facts.statuses.len(),
        facts.team_members.len()
      );
    }
    Some(Cmd::Ask { question }) => {
      let orchestrator = orchestrator(&config, tools, args.stream)?;
      app::ask_once(&orchestrator, &question.join(" ")).await?;
    }
    None => {
      let orchestrator = orchestrator(&config, tools, args.stream)?;
      let mut app = app::App::new(orchestrator, config.llm.context_window);
      app.run().await?;
    }
  }

  Ok(())
}

fn orchestrator(config: &Config, tools: Arc<ToolExecutor>, stream: bool) -> Result<Orchestrator> {
  let model = OpenAiCompatClient::from_config(&config.llm, Config::get_llm_api_key())?;
  Ok(
    Orchestrator::new(Arc::new(model), tools)
      .with_project_key(config.jira.project_key.clone())
      .with_max_iterations(config.llm.max_tool_iterations)
      .with_streaming(stream),
  )
}
