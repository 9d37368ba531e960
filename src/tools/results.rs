//! Tool results as returned to the model.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::jira::browse_url;
use crate::jira::types::{BoardInfo, Issue, Sprint, SprintIssue, SprintState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSummary {
  pub name: String,
  pub project_key: String,
  pub project_name: String,
}

impl From<&BoardInfo> for BoardSummary {
  fn from(board: &BoardInfo) -> Self {
    Self {
      name: board.name.clone(),
      project_key: board.project_key.clone(),
      project_name: board.project_name.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintRef {
  pub id: u64,
  pub name: String,
  pub state: SprintState,
}

impl From<&Sprint> for SprintRef {
  fn from(sprint: &Sprint) -> Self {
    Self {
      id: sprint.id,
      name: sprint.name.clone(),
      state: sprint.state,
    }
  }
}

/// How one requested name resolved against the roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonMatch {
  pub name: String,
  pub resolved_email: Option<String>,
  pub possible_matches: Vec<String>,
  pub not_found: bool,
}

impl PersonMatch {
  pub fn from_matches(name: &str, emails: Vec<String>) -> Self {
    let name = name.to_string();
    match emails.len() {
      0 => Self {
        name,
        resolved_email: None,
        possible_matches: Vec::new(),
        not_found: true,
      },
      1 => Self {
        name,
        resolved_email: emails.into_iter().next(),
        possible_matches: Vec::new(),
        not_found: false,
      },
      _ => Self {
        name,
        resolved_email: None,
        possible_matches: emails,
        not_found: false,
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrepareSearchResult {
  pub all_team: bool,
  /// Every roster email, when no names were given
  #[serde(skip_serializing_if = "Option::is_none")]
  pub team_members: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub people: Option<Vec<PersonMatch>>,
  pub board: BoardSummary,
  pub sprints: Vec<SprintRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedIssue {
  pub key: String,
  /// Markdown link to the issue
  pub key_link: String,
  pub summary: String,
  pub status: String,
  /// Assignee email, comparable with `filters_applied.assignees`
  pub assignee: Option<String>,
  pub assignee_name: Option<String>,
  pub story_points: Option<f64>,
}

impl FormattedIssue {
  pub fn new(issue: &SprintIssue, base_url: &str) -> Self {
    Self {
      key: issue.key.clone(),
      key_link: format!("[{}]({})", issue.key, browse_url(base_url, &issue.key)),
      summary: issue.summary.clone(),
      status: issue.status.clone(),
      assignee: issue.assignee.clone(),
      assignee_name: issue.assignee_display_name.clone(),
      story_points: issue.story_points,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintBucket {
  pub issue_count: usize,
  pub issues: Vec<FormattedIssue>,
}

/// Per-sprint results keyed by sprint name, in request order.
///
/// Two sprints sharing a name collapse into one entry; the later one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprintBuckets(Vec<(String, SprintBucket)>);

impl SprintBuckets {
  pub fn insert(&mut self, name: String, bucket: SprintBucket) {
    match self.0.iter_mut().find(|(existing, _)| *existing == name) {
      Some(slot) => slot.1 = bucket,
      None => self.0.push((name, bucket)),
    }
  }

  pub fn get(&self, name: &str) -> Option<&SprintBucket> {
    self
      .0
      .iter()
      .find(|(existing, _)| existing == name)
      .map(|(_, bucket)| bucket)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl Serialize for SprintBuckets {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(self.0.iter().map(|(name, bucket)| (name, bucket)))
  }
}

/// Echo of the filters the listing ran with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltersApplied {
  pub sprint_ids: Vec<u64>,
  pub assignees: Option<Vec<String>>,
  pub status_filters: Option<Vec<String>>,
  pub keyword: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeStats {
  pub name: String,
  pub email: Option<String>,
  pub points: f64,
  pub tasks: usize,
}

/// Story points and task counts per assignee, largest load first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeBreakdown {
  pub sprint_name: String,
  pub total_points: f64,
  pub total_tasks: usize,
  pub assignees: Vec<AssigneeStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintIssuesResult {
  pub total_issues: usize,
  pub total_story_points: f64,
  pub filters_applied: FiltersApplied,
  pub sprints: SprintBuckets,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub breakdown: Option<AssigneeBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIssueResult {
  pub key: String,
  pub url: String,
  pub summary: String,
  pub issue_type: String,
  pub assignee: Option<String>,
  pub sprint: Option<String>,
  pub story_points: Option<f64>,
  pub status: String,
}

/// Result of any tool, serialized as the tool message content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
  PrepareSearch(PrepareSearchResult),
  SprintIssues(SprintIssuesResult),
  Issue(Box<Issue>),
  CreatedIssue(CreateIssueResult),
}

impl ToolOutput {
  pub fn to_json(&self) -> Value {
    serde_json::to_value(self).unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
  }

  /// Payload worth showing to the user as-is, alongside the model's answer.
  pub fn structured_payload(&self) -> Option<Value> {
    match self {
      ToolOutput::SprintIssues(result) => match &result.breakdown {
        Some(breakdown) => serde_json::to_value(breakdown).ok(),
        None => None,
      },
      ToolOutput::CreatedIssue(created) => serde_json::to_value(created).ok(),
      ToolOutput::PrepareSearch(_) | ToolOutput::Issue(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::jira::fake::issue;
  use serde_json::json;

  #[test]
  fn test_person_match_shapes() {
    assert!(PersonMatch::from_matches("maria", vec![]).not_found);

    let one = PersonMatch::from_matches("ana", vec!["ana@x.com".into()]);
    assert_eq!(one.resolved_email.as_deref(), Some("ana@x.com"));

    let many = PersonMatch::from_matches("john", vec!["js@x.com".into(), "jl@x.com".into()]);
    assert!(many.resolved_email.is_none());
    assert_eq!(
      serde_json::to_value(&many).unwrap(),
      json!({
        "name": "john",
        "resolved_email": null,
        "possible_matches": ["js@x.com", "jl@x.com"],
        "not_found": false
      })
    );
    assert_eq!(
      serde_json::to_value(PersonMatch::from_matches("maria", vec![])).unwrap(),
      json!({
        "name": "maria",
        "resolved_email": null,
        "possible_matches": [],
        "not_found": true
      })
    );
  }

  #[test]
  fn test_formatted_issue_links_to_browse_page() {
    let formatted = FormattedIssue::new(
      &issue("ODPP-7", "In QA", Some(("ana@x.com", "Ana")), Some(2.0)),
      "https://acme.atlassian.net/",
    );
    assert_eq!(
      formatted.key_link,
      "[ODPP-7](https://acme.atlassian.net/browse/ODPP-7)"
    );
    assert_eq!(formatted.assignee.as_deref(), Some("ana@x.com"));
    assert_eq!(formatted.assignee_name.as_deref(), Some("Ana"));
  }

  #[test]
  fn test_filters_applied_keeps_unset_filters_as_null() {
    let filters = FiltersApplied {
      sprint_ids: vec![42],
      assignees: None,
      status_filters: None,
      keyword: None,
    };
    assert_eq!(
      serde_json::to_value(&filters).unwrap(),
      json!({ "sprint_ids": [42], "assignees": null, "status_filters": null, "keyword": null })
    );
  }

  #[test]
  fn test_buckets_keep_order_and_collapse_duplicate_names() {
    let bucket = |n| SprintBucket {
      issue_count: n,
      issues: Vec::new(),
    };
    let mut buckets = SprintBuckets::default();
    buckets.insert("Sprint 26".into(), bucket(1));
    buckets.insert("Sprint 25".into(), bucket(2));
    buckets.insert("Sprint 26".into(), bucket(3));

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets.get("Sprint 26").map(|b| b.issue_count), Some(3));
    let json = serde_json::to_string(&buckets).unwrap();
    assert!(json.find("Sprint 26").unwrap() < json.find("Sprint 25").unwrap());
  }
}
