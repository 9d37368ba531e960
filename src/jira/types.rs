use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sprint lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
  Future,
  Active,
  Closed,
}

impl SprintState {
  pub fn as_str(&self) -> &'static str {
    match self {
      SprintState::Future => "future",
      SprintState::Active => "active",
      SprintState::Closed => "closed",
    }
  }
}

impl std::fmt::Display for SprintState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which sprints to ask the board for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintStateFilter {
  All,
  Only(SprintState),
}

/// Sprint on the configured board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprint {
  pub id: u64,
  pub name: String,
  pub state: SprintState,
  pub start_date: Option<DateTime<Utc>>,
  pub end_date: Option<DateTime<Utc>>,
  pub goal: Option<String>,
}

/// Issue as listed inside a sprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintIssue {
  pub key: String,
  pub summary: String,
  pub status: String,
  pub issue_type: String,
  /// Assignee email
  pub assignee: Option<String>,
  pub assignee_display_name: Option<String>,
  pub story_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
  pub author: String,
  pub body: String,
  pub created: String,
}

/// Full issue details, including the comment thread
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
  pub key: String,
  pub summary: String,
  pub description: Option<String>,
  pub status: String,
  pub issue_type: String,
  pub priority: Option<String>,
  pub assignee: Option<String>,
  pub assignee_display_name: Option<String>,
  pub reporter: Option<String>,
  pub story_points: Option<f64>,
  pub labels: Vec<String>,
  pub created: String,
  pub updated: String,
  pub comments: Vec<Comment>,
}

/// Board summary with its project linkage
#[derive(Debug, Clone, PartialEq)]
pub struct BoardInfo {
  pub id: u64,
  pub name: String,
  pub board_type: String, // "scrum" or "kanban"
  pub project_key: String,
  pub project_name: String,
}

/// Person seen as an assignee on recent sprint issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
  pub name: String,
  pub email: String,
}

/// Workflow transition available for an issue
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
  pub id: String,
  pub name: String,
}

/// Fields for a new issue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewIssue {
  pub project_key: String,
  pub summary: String,
  pub description: Option<String>,
  pub issue_type: String,
  pub assignee_email: Option<String>,
  pub story_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedIssue {
  pub key: String,
  pub url: String,
}
