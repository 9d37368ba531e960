use serde::Serialize;
use serde_json::{json, Value};

use super::call::ToolName;

/// Function tool offered to the model, in chat-completions shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
  #[serde(rename = "type")]
  pub kind: &'static str,
  pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
  pub name: &'static str,
  pub description: &'static str,
  pub parameters: Value,
}

impl ToolDefinition {
  fn function(name: ToolName, description: &'static str, parameters: Value) -> Self {
    Self {
      kind: "function",
      function: FunctionDefinition {
        name: name.as_str(),
        description,
        parameters,
      },
    }
  }
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
  ToolName::ALL.into_iter().map(definition).collect()
}

fn definition(tool: ToolName) -> ToolDefinition {
  match tool {
    ToolName::PrepareSearch => ToolDefinition::function(
      tool,
      "Resolve people and sprints before searching. Call this first: it returns the board, \
       the sprints in scope and the email of each named person (or every team member when \
       no names are given).",
      json!({
        "type": "object",
        "properties": {
          "names": {
            "type": "array",
            "items": { "type": "string" },
            "description": "People mentioned by the user, by name or email. Omit for the whole team."
          },
          "sprint_ids": {
            "type": "array",
            "items": { "type": "integer" },
            "description": "Sprint ids from AVAILABLE SPRINTS. Omit for the active sprint."
          }
        }
      }),
    ),
    ToolName::GetSprintIssues => ToolDefinition::function(
      tool,
      "List issues in one or more sprints, optionally filtered by assignee, status and keyword. \
       Set include_breakdown for story points and task counts per person.",
      json!({
        "type": "object",
        "properties": {
          "sprint_ids": {
            "type": "array",
            "items": { "type": "integer" },
            "description": "Sprint ids from AVAILABLE SPRINTS"
          },
          "assignees": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Assignee emails as returned by prepare_search"
          },
          "status_filters": {
            "type": "array",
            "items": { "type": "string" },
            "description": "'done', 'in_progress', 'todo' or an exact status from AVAILABLE STATUSES"
          },
          "keyword": {
            "type": "string",
            "description": "Text the issue summary must contain"
          },
          "include_breakdown": {
            "type": "boolean",
            "description": "Add a per-assignee breakdown of points and tasks"
          }
        },
        "required": ["sprint_ids"]
      }),
    ),
    ToolName::GetIssue => ToolDefinition::function(
      tool,
      "Get full details of a single issue, including description and comments.",
      json!({
        "type": "object",
        "properties": {
          "issue_key": {
            "type": "string",
            "description": "Issue key, e.g. ODPP-1097"
          }
        },
        "required": ["issue_key"]
      }),
    ),
    ToolName::CreateIssue => ToolDefinition::function(
      tool,
      "Create a new issue, optionally assigning it, placing it in a sprint and moving it to a status.",
      json!({
        "type": "object",
        "properties": {
          "summary": { "type": "string", "description": "Issue title" },
          "description": { "type": "string" },
          "issue_type": {
            "type": "string",
            "description": "Story, Bug, Task... Defaults to Story"
          },
          "assignee": {
            "type": "string",
            "description": "Name or email of a team member"
          },
          "sprint_id": {
            "type": "integer",
            "description": "Sprint id from AVAILABLE SPRINTS"
          },
          "story_points": { "type": "number" },
          "status": {
            "type": "string",
            "description": "Status to move the issue to after creation"
          }
        },
        "required": ["summary"]
      }),
    ),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_one_definition_per_tool() {
    let names: Vec<&str> = tool_definitions().iter().map(|d| d.function.name).collect();
    assert_eq!(
      names,
      vec!["prepare_search", "get_sprint_issues", "get_issue", "create_issue"]
    );
  }

  #[test]
  fn test_definition_wire_shape() {
    let json = serde_json::to_value(definition(ToolName::GetIssue)).unwrap();
    assert_eq!(json["type"], "function");
    assert_eq!(json["function"]["name"], "get_issue");
    assert_eq!(json["function"]["parameters"]["required"][0], "issue_key");
  }
}
