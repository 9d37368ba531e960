//! Errors surfaced by tools, the fact cache and name resolution.
//!
//! Everything except [`AssistantError::ConfigMissing`] is meant to be handed
//! back to the model as a tool result so it can correct itself or ask the
//! user for clarification.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssistantError {
  #[error("{0} not configured in environment")]
  ConfigMissing(&'static str),

  #[error("Unknown tool: {0}")]
  UnknownTool(String),

  #[error("{0} is required")]
  MissingArgument(&'static str),

  #[error("Invalid arguments for {tool}: {message}")]
  InvalidArguments { tool: String, message: String },

  #[error(
    "Invalid sprint IDs: {}. Locate the correct IDs from AVAILABLE SPRINTS list.",
    join(.0)
  )]
  InvalidSprintIds(Vec<u64>),

  #[error("No team member matches \"{input}\". Team members: {}", .roster.join(", "))]
  PersonNotFound { input: String, roster: Vec<String> },

  #[error(
    "\"{input}\" matches multiple team members: {}. Ask the user which one they mean.",
    .candidates.join(", ")
  )]
  AmbiguousPerson {
    input: String,
    candidates: Vec<String>,
  },

  #[error(
    "Issue {key} was created but cannot be moved to \"{requested}\". Available transitions: {}",
    .available.join(", ")
  )]
  TransitionUnavailable {
    key: String,
    requested: String,
    available: Vec<String>,
  },

  #[error("Jira request failed: {0}")]
  Upstream(String),
}

impl AssistantError {
  /// Fatal errors abort the conversation turn instead of being fed back to the model.
  pub fn is_fatal(&self) -> bool {
    matches!(self, AssistantError::ConfigMissing(_))
  }
}

impl From<color_eyre::Report> for AssistantError {
  fn from(report: color_eyre::Report) -> Self {
    AssistantError::Upstream(format!("{:#}", report))
  }
}

fn join(ids: &[u64]) -> String {
  ids
    .iter()
    .map(|id| id.to_string())
    .collect::<Vec<_>>()
    .join(", ")
}
