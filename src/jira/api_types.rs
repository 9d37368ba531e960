//! Serde-deserializable types matching Jira API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use super::types::{
  BoardInfo, Comment, Issue, Sprint, SprintIssue, SprintState, Transition,
};

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiStatus {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiIssueType {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
  #[serde(rename = "accountId")]
  pub account_id: Option<String>,
  /// Server/DC user name, used when there is no account id
  pub name: Option<String>,
  #[serde(rename = "emailAddress")]
  pub email_address: Option<String>,
  #[serde(rename = "displayName", default)]
  pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiPriority {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiComment {
  pub author: Option<ApiUser>,
  pub body: Option<serde_json::Value>,
  #[serde(default)]
  pub created: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiComments {
  #[serde(default)]
  pub comments: Vec<ApiComment>,
}

// ============================================================================
// Issue fields - used by sprint issues and issue detail endpoints
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ApiIssueFields {
  #[serde(default)]
  pub summary: String,
  pub status: Option<ApiStatus>,
  #[serde(rename = "issuetype")]
  pub issue_type: Option<ApiIssueType>,
  pub assignee: Option<ApiUser>,
  pub reporter: Option<ApiUser>,
  pub priority: Option<ApiPriority>,
  #[serde(default)]
  pub labels: Vec<String>,
  #[serde(default)]
  pub created: String,
  #[serde(default)]
  pub updated: String,
  // Description is complex (can be string or ADF), handled separately
  pub description: Option<serde_json::Value>,
  pub comment: Option<ApiComments>,
  // Catch-all for custom fields (like story points)
  #[serde(flatten)]
  pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiIssue {
  pub key: String,
  #[serde(default)]
  pub fields: ApiIssueFields,
}

// ============================================================================
// Paged agile responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiSprintIssuesResponse {
  #[serde(default)]
  pub issues: Vec<ApiIssue>,
  #[serde(default)]
  pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct ApiSprint {
  pub id: u64,
  pub name: String,
  pub state: SprintState,
  #[serde(rename = "startDate")]
  pub start_date: Option<String>,
  #[serde(rename = "endDate")]
  pub end_date: Option<String>,
  pub goal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSprintsResponse {
  #[serde(default)]
  pub values: Vec<ApiSprint>,
  #[serde(rename = "isLast", default)]
  pub is_last: bool,
}

// ============================================================================
// Board endpoint response
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ApiBoardLocation {
  #[serde(rename = "projectKey", default)]
  pub project_key: String,
  #[serde(rename = "projectName", default)]
  pub project_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiBoard {
  pub id: u64,
  pub name: String,
  #[serde(rename = "type", default)]
  pub board_type: String,
  #[serde(default)]
  pub location: ApiBoardLocation,
}

// ============================================================================
// Transitions / create responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiTransition {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTransitionsResponse {
  #[serde(default)]
  pub transitions: Vec<ApiTransition>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCreatedIssue {
  pub key: String,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl ApiIssue {
  pub fn into_sprint_issue(self, story_points_field: &str) -> SprintIssue {
    let f = self.fields;
    let story_points = extract_number(f.extra.get(story_points_field));
    SprintIssue {
      key: self.key,
      summary: f.summary,
      status: f.status.map(|s| s.name).unwrap_or_default(),
      issue_type: f.issue_type.map(|t| t.name).unwrap_or_default(),
      assignee: f
        .assignee
        .as_ref()
        .and_then(|u| u.email_address.clone()),
      assignee_display_name: f.assignee.map(|u| u.display_name),
      story_points,
    }
  }

  pub fn into_full(self, story_points_field: &str) -> Issue {
    let f = self.fields;
    let story_points = extract_number(f.extra.get(story_points_field));
    Issue {
      key: self.key,
      summary: f.summary,
      description: f.description.as_ref().and_then(extract_description),
      status: f.status.map(|s| s.name).unwrap_or_default(),
      issue_type: f.issue_type.map(|t| t.name).unwrap_or_default(),
      priority: f.priority.map(|p| p.name),
      assignee: f
        .assignee
        .as_ref()
        .and_then(|u| u.email_address.clone()),
      assignee_display_name: f.assignee.map(|u| u.display_name),
      reporter: f.reporter.map(|u| u.display_name),
      story_points,
      labels: f.labels,
      created: f.created,
      updated: f.updated,
      comments: f
        .comment
        .unwrap_or_default()
        .comments
        .into_iter()
        .map(Comment::from)
        .collect(),
    }
  }
}

impl From<ApiComment> for Comment {
  fn from(c: ApiComment) -> Self {
    Comment {
      author: c.author.map(|u| u.display_name).unwrap_or_default(),
      body: c
        .body
        .as_ref()
        .and_then(extract_description)
        .unwrap_or_default(),
      created: c.created,
    }
  }
}

impl From<ApiSprint> for Sprint {
  fn from(s: ApiSprint) -> Self {
    Sprint {
      id: s.id,
      name: s.name,
      state: s.state,
      start_date: s.start_date.as_deref().and_then(parse_timestamp),
      end_date: s.end_date.as_deref().and_then(parse_timestamp),
      goal: s.goal.filter(|g| !g.is_empty()),
    }
  }
}

impl From<ApiBoard> for BoardInfo {
  fn from(b: ApiBoard) -> Self {
    BoardInfo {
      id: b.id,
      name: b.name,
      board_type: b.board_type,
      project_key: b.location.project_key,
      project_name: b.location.project_name,
    }
  }
}

impl From<ApiTransition> for Transition {
  fn from(t: ApiTransition) -> Self {
    Transition {
      id: t.id,
      name: t.name,
    }
  }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(value)
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

/// Story points are stored as a number, but some instances return them as strings.
fn extract_number(value: Option<&serde_json::Value>) -> Option<f64> {
  let value = value?;
  value
    .as_f64()
    .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Extract plain text from Jira's ADF or plain text format
fn extract_description(value: &serde_json::Value) -> Option<String> {
  // If it's a string, return it directly (API v2)
  if let Some(s) = value.as_str() {
    return Some(s.to_string());
  }

  // If it's an ADF document (API v3), extract text content
  if let Some(content) = value.get("content").and_then(|v| v.as_array()) {
    let mut text = String::new();
    extract_adf_text(content, &mut text);
    if !text.is_empty() {
      return Some(text.trim_end().to_string());
    }
  }

  None
}

/// Recursively extract text from ADF content
fn extract_adf_text(content: &[serde_json::Value], output: &mut String) {
  for node in content {
    let Some(node_type) = node.get("type").and_then(|v| v.as_str()) else {
      continue;
    };
    match node_type {
      "text" => {
        if let Some(text) = node.get("text").and_then(|v| v.as_str()) {
          output.push_str(text);
        }
      }
      "hardBreak" => output.push('\n'),
      _ => {
        if let Some(children) = node.get("content").and_then(|v| v.as_array()) {
          extract_adf_text(children, output);
        }
        if node_type == "paragraph" || node_type == "heading" {
          output.push('\n');
        }
      }
    }
  }
}
