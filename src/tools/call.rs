//! Tool calls as requested by the model, parsed into typed arguments.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::error::AssistantError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
  PrepareSearch,
  GetSprintIssues,
  GetIssue,
  CreateIssue,
}

impl ToolName {
  pub const ALL: [ToolName; 4] = [
    ToolName::PrepareSearch,
    ToolName::GetSprintIssues,
    ToolName::GetIssue,
    ToolName::CreateIssue,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ToolName::PrepareSearch => "prepare_search",
      ToolName::GetSprintIssues => "get_sprint_issues",
      ToolName::GetIssue => "get_issue",
      ToolName::CreateIssue => "create_issue",
    }
  }
}

impl std::fmt::Display for ToolName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ToolName {
  type Err = AssistantError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ToolName::ALL
      .into_iter()
      .find(|tool| tool.as_str() == s)
      .ok_or_else(|| AssistantError::UnknownTool(s.to_string()))
  }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrepareSearchArgs {
  #[serde(deserialize_with = "null_as_default")]
  pub names: Vec<String>,
  #[serde(deserialize_with = "lenient_ids")]
  pub sprint_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SprintIssuesArgs {
  #[serde(deserialize_with = "lenient_ids")]
  pub sprint_ids: Vec<u64>,
  #[serde(alias = "assignee_emails", deserialize_with = "null_as_default")]
  pub assignees: Vec<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub status_filters: Vec<String>,
  pub keyword: Option<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub include_breakdown: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GetIssueArgs {
  #[serde(deserialize_with = "null_as_default")]
  pub issue_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreateIssueArgs {
  #[serde(deserialize_with = "null_as_default")]
  pub summary: String,
  pub description: Option<String>,
  pub issue_type: Option<String>,
  pub assignee: Option<String>,
  #[serde(deserialize_with = "lenient_id")]
  pub sprint_id: Option<u64>,
  pub story_points: Option<f64>,
  pub status: Option<String>,
}

/// A tool call with its arguments decoded for the named tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
  PrepareSearch(PrepareSearchArgs),
  GetSprintIssues(SprintIssuesArgs),
  GetIssue(GetIssueArgs),
  CreateIssue(CreateIssueArgs),
}

impl ToolCall {
  /// Decode a raw `(name, arguments)` pair.
  ///
  /// `arguments` may be an object, a JSON-encoded string of one, or null.
  pub fn parse(name: &str, arguments: Value) -> Result<Self, AssistantError> {
    let tool: ToolName = name.parse()?;
    let invalid = |e: serde_json::Error| AssistantError::InvalidArguments {
      tool: tool.to_string(),
      message: e.to_string(),
    };

    let arguments = match arguments {
      Value::Null => Value::Object(Default::default()),
      Value::String(s) if s.trim().is_empty() => Value::Object(Default::default()),
      Value::String(s) => serde_json::from_str(&s).map_err(invalid)?,
      other => other,
    };
    if !arguments.is_object() {
      return Err(AssistantError::InvalidArguments {
        tool: tool.to_string(),
        message: "arguments must be a JSON object".to_string(),
      });
    }

    Ok(match tool {
      ToolName::PrepareSearch => ToolCall::PrepareSearch(serde_json::from_value(arguments).map_err(invalid)?),
      ToolName::GetSprintIssues => {
        ToolCall::GetSprintIssues(serde_json::from_value(arguments).map_err(invalid)?)
      }
      ToolName::GetIssue => ToolCall::GetIssue(serde_json::from_value(arguments).map_err(invalid)?),
      ToolName::CreateIssue => ToolCall::CreateIssue(serde_json::from_value(arguments).map_err(invalid)?),
    })
  }

  pub fn name(&self) -> ToolName {
    match self {
      ToolCall::PrepareSearch(_) => ToolName::PrepareSearch,
      ToolCall::GetSprintIssues(_) => ToolName::GetSprintIssues,
      ToolCall::GetIssue(_) => ToolName::GetIssue,
      ToolCall::CreateIssue(_) => ToolName::CreateIssue,
    }
  }
}

// ============================================================================
// Lenient decoding helpers
// ============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids arrive as numbers, floats like `9887.0`, or numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
  Int(u64),
  Float(f64),
  Text(String),
}

impl IdValue {
  fn into_id<E: de::Error>(self) -> Result<u64, E> {
    match self {
      IdValue::Int(id) => Ok(id),
      IdValue::Float(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
      IdValue::Float(f) => Err(E::custom(format!("invalid id {}", f))),
      IdValue::Text(s) => s
        .trim()
        .parse()
        .map_err(|_| E::custom(format!("invalid id {:?}", s))),
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdList {
  Many(Vec<IdValue>),
  One(IdValue),
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<IdList>::deserialize(deserializer)? {
    None => Ok(Vec::new()),
    Some(IdList::One(id)) => Ok(vec![id.into_id()?]),
    Some(IdList::Many(ids)) => ids.into_iter().map(IdValue::into_id).collect(),
  }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<IdValue>::deserialize(deserializer)?
    .map(IdValue::into_id)
    .transpose()
}
