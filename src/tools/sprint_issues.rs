use futures::future::try_join_all;
use std::collections::HashMap;
use tracing::debug;

use super::call::SprintIssuesArgs;
use super::executor::{ToolExecutor, BOARD_SPRINT_LIMIT};
use super::results::{
  AssigneeBreakdown, AssigneeStats, FiltersApplied, FormattedIssue, SprintBucket, SprintBuckets,
  SprintIssuesResult,
};
use crate::error::AssistantError;
use crate::filter::FilterPipeline;
use crate::jira::types::{SprintIssue, SprintStateFilter, TeamMember};
use crate::resolve::resolve_email;
use crate::sprints::{sprint_label, validate_sprint_ids};

const UNASSIGNED: &str = "Unassigned";

impl ToolExecutor {
  /// List issues for the requested sprints after filtering.
  pub(super) async fn get_sprint_issues(
    &self,
    args: SprintIssuesArgs,
  ) -> Result<SprintIssuesResult, AssistantError> {
    if args.sprint_ids.is_empty() {
      return Err(AssistantError::MissingArgument("sprint_ids"));
    }
    let board_id = self.jira.board_id()?;

    let needs_team = !args.assignees.is_empty() || args.include_breakdown;
    let (board_sprints, team) = tokio::try_join!(
      async {
        self
          .backend
          .list_sprints(board_id, SprintStateFilter::All, BOARD_SPRINT_LIMIT)
          .await
          .map_err(AssistantError::from)
      },
      async {
        if needs_team {
          self.cache.team_members().await
        } else {
          Ok(Vec::new())
        }
      },
    )?;
    validate_sprint_ids(&args.sprint_ids, &board_sprints)?;

    let assignees: Vec<String> = args
      .assignees
      .iter()
      .map(|a| a.trim())
      .filter(|a| !a.is_empty())
      .map(|a| resolve_email(a, &team))
      .collect();
    let keyword = args
      .keyword
      .as_deref()
      .map(str::trim)
      .filter(|k| !k.is_empty());

    let pipeline = FilterPipeline::new()
      .with_assignees(&assignees)
      .with_statuses(&args.status_filters)
      .with_keyword(keyword);
    debug!(filters = pipeline.len(), sprints = args.sprint_ids.len(), "listing sprint issues");

    let fetched = try_join_all(
      args
        .sprint_ids
        .iter()
        .map(|id| self.backend.get_sprint_issues(*id)),
    )
    .await?;

    let mut sprints = SprintBuckets::default();
    let mut surviving: Vec<SprintIssue> = Vec::new();
    let mut total_story_points = 0.0;
    for (id, issues) in args.sprint_ids.iter().zip(fetched) {
      let issues = pipeline.apply(issues);
      total_story_points += issues.iter().filter_map(|i| i.story_points).sum::<f64>();
      let formatted: Vec<FormattedIssue> = issues
        .iter()
        .map(|i| FormattedIssue::new(i, &self.jira.url))
        .collect();
      sprints.insert(
        sprint_label(*id, &board_sprints),
        SprintBucket {
          issue_count: formatted.len(),
          issues: formatted,
        },
      );
      surviving.extend(issues);
    }

    let breakdown = args.include_breakdown.then(|| {
      let label = args
        .sprint_ids
        .iter()
        .map(|id| sprint_label(*id, &board_sprints))
        .collect::<Vec<_>>()
        .join(", ");
      assignee_breakdown(label, &surviving, &team)
    });

    Ok(SprintIssuesResult {
      total_issues: surviving.len(),
      total_story_points,
      filters_applied: FiltersApplied {
        sprint_ids: args.sprint_ids,
        assignees: (!assignees.is_empty()).then_some(assignees),
        status_filters: (!args.status_filters.is_empty()).then_some(args.status_filters),
        keyword: keyword.map(str::to_string),
      },
      sprints,
      breakdown,
    })
  }
}

/// Group issues by assignee, most story points first, then most tasks.
fn assignee_breakdown(
  sprint_name: String,
  issues: &[SprintIssue],
  team: &[TeamMember],
) -> AssigneeBreakdown {
  let mut by_email: HashMap<Option<String>, AssigneeStats> = HashMap::new();
  for issue in issues {
    let email = issue.assignee.as_ref().map(|e| e.to_lowercase());
    let stats = by_email.entry(email.clone()).or_insert_with(|| {
      let name = match &email {
        Some(email) => team
          .iter()
          .find(|m| m.email.eq_ignore_ascii_case(email))
          .map(|m| m.name.clone())
          .or_else(|| issue.assignee_display_name.clone())
          .unwrap_or_else(|| email.clone()),
        None => UNASSIGNED.to_string(),
      };
      AssigneeStats {
        name,
        email,
        points: 0.0,
        tasks: 0,
      }
    });
    stats.points += issue.story_points.unwrap_or(0.0);
    stats.tasks += 1;
  }

  let mut assignees: Vec<AssigneeStats> = by_email.into_values().collect();
  assignees.sort_by(|a, b| {
    b.points
      .total_cmp(&a.points)
      .then_with(|| b.tasks.cmp(&a.tasks))
      .then_with(|| a.name.cmp(&b.name))
  });

  AssigneeBreakdown {
    sprint_name,
    total_points: assignees.iter().map(|a| a.points).sum(),
    total_tasks: issues.len(),
    assignees,
  }
}
