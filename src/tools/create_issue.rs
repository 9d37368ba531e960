use tracing::{info, warn};

use super::call::CreateIssueArgs;
use super::executor::{ToolExecutor, BOARD_SPRINT_LIMIT};
use super::results::CreateIssueResult;
use crate::error::AssistantError;
use crate::jira::types::{NewIssue, SprintStateFilter};
use crate::resolve::resolve_email_strict;
use crate::sprints::sprint_label;

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

fn same_name(a: &str, b: &str) -> bool {
  a.to_lowercase() == b.to_lowercase()
}

impl ToolExecutor {
  /// Create an issue, then place it in a sprint and move it to a status if asked.
  pub(super) async fn create_issue(
    &self,
    args: CreateIssueArgs,
  ) -> Result<CreateIssueResult, AssistantError> {
    let summary = args.summary.trim().to_string();
    if summary.is_empty() {
      return Err(AssistantError::MissingArgument("summary"));
    }
    let board_id = self.jira.board_id()?;

    let assignee = match non_blank(args.assignee) {
      Some(person) => {
        let team = self.cache.team_members().await?;
        Some(resolve_email_strict(&person, &team)?)
      }
      None => None,
    };

    let project_key = match &self.jira.project_key {
      Some(key) => key.clone(),
      None => self.backend.get_board_info(board_id).await?.project_key,
    };
    let issue_type =
      non_blank(args.issue_type).unwrap_or_else(|| self.jira.default_issue_type.clone());

    let created = self
      .backend
      .create_issue(&NewIssue {
        project_key,
        summary: summary.clone(),
        description: non_blank(args.description),
        issue_type: issue_type.clone(),
        assignee_email: assignee.clone(),
        story_points: args.story_points,
      })
      .await?;
    info!(key = %created.key, "created issue");

    let sprint = match args.sprint_id {
      Some(sprint_id) => {
        self
          .backend
          .move_issues_to_sprint(sprint_id, std::slice::from_ref(&created.key))
          .await?;
        let sprints = self
          .backend
          .list_sprints(board_id, SprintStateFilter::All, BOARD_SPRINT_LIMIT)
          .await
          .unwrap_or_else(|e| {
            warn!(error = %e, "could not list sprints to name the target sprint");
            Vec::new()
          });
        Some(sprint_label(sprint_id, &sprints))
      }
      None => None,
    };

    let mut status = self.jira.initial_status.clone();
    if let Some(requested) =
      non_blank(args.status).filter(|s| !same_name(s, &self.jira.initial_status))
    {
      let transitions = self.backend.get_transitions(&created.key).await?;
      let Some(transition) = transitions.iter().find(|t| same_name(&t.name, &requested)) else {
        return Err(AssistantError::TransitionUnavailable {
          key: created.key,
          requested,
          available: transitions.into_iter().map(|t| t.name).collect(),
        });
      };
      self
        .backend
        .transition_issue(&created.key, &transition.id)
        .await?;
      status = transition.name.clone();
    }

    Ok(CreateIssueResult {
      key: created.key,
      url: created.url,
      summary,
      issue_type,
      assignee,
      sprint,
      story_points: args.story_points,
      status,
    })
  }
}
