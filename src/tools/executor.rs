use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::call::ToolCall;
use super::definitions::{tool_definitions, ToolDefinition};
use super::results::ToolOutput;
use crate::cache::FactCache;
use crate::config::JiraConfig;
use crate::error::AssistantError;
use crate::jira::JiraBackend;

/// How many recent board sprints are listed when checking or naming sprint ids
pub(super) const BOARD_SPRINT_LIMIT: usize = 50;

/// Runs tool calls against Jira and the fact cache.
pub struct ToolExecutor {
  pub(super) backend: Arc<dyn JiraBackend>,
  pub(super) cache: Arc<FactCache>,
  pub(super) jira: JiraConfig,
}

impl ToolExecutor {
  pub fn new(backend: Arc<dyn JiraBackend>, cache: Arc<FactCache>, jira: JiraConfig) -> Self {
    Self {
      backend,
      cache,
      jira,
    }
  }

  pub fn definitions(&self) -> Vec<ToolDefinition> {
    tool_definitions()
  }

  pub fn cache(&self) -> &Arc<FactCache> {
    &self.cache
  }

  /// Parse and run a call by name, as received from the model.
  pub async fn execute_raw(&self, name: &str, arguments: Value) -> Result<ToolOutput, AssistantError> {
    let call = ToolCall::parse(name, arguments)?;
    self.execute(call).await
  }

  pub async fn execute(&self, call: ToolCall) -> Result<ToolOutput, AssistantError> {
    let tool = call.name();
    let started = Instant::now();
    debug!(%tool, "executing tool");

    let result = match call {
      ToolCall::PrepareSearch(args) => self.prepare_search(args).await.map(ToolOutput::PrepareSearch),
      ToolCall::GetSprintIssues(args) => {
        self.get_sprint_issues(args).await.map(ToolOutput::SprintIssues)
      }
      ToolCall::GetIssue(args) => self
        .get_issue(args)
        .await
        .map(|issue| ToolOutput::Issue(Box::new(issue))),
      ToolCall::CreateIssue(args) => self.create_issue(args).await.map(ToolOutput::CreatedIssue),
    };

    match &result {
      Ok(_) => debug!(%tool, elapsed_ms = started.elapsed().as_millis() as u64, "tool finished"),
      Err(e) => warn!(%tool, error = %e, "tool failed"),
    }
    result
  }
}
