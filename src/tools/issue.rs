use super::call::GetIssueArgs;
use super::executor::ToolExecutor;
use crate::error::AssistantError;
use crate::jira::types::Issue;

impl ToolExecutor {
  pub(super) async fn get_issue(&self, args: GetIssueArgs) -> Result<Issue, AssistantError> {
    let key = args.issue_key.trim();
    if key.is_empty() {
      return Err(AssistantError::MissingArgument("issue_key"));
    }
    Ok(self.backend.get_issue(&key.to_uppercase()).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::jira::fake::FakeJira;
  use crate::jira::types::Comment;
  use crate::tools::executor::test_support::executor;

  fn detailed(key: &str) -> Issue {
    Issue {
      key: key.to_string(),
      summary: "Checkout fails on empty cart".to_string(),
      description: Some("Steps to reproduce...".to_string()),
      status: "In QA".to_string(),
      issue_type: "Bug".to_string(),
      priority: Some("High".to_string()),
      assignee: Some("ana@x.com".to_string()),
      assignee_display_name: Some("Ana Souza".to_string()),
      reporter: Some("Bo Lima".to_string()),
      story_points: Some(3.0),
      labels: vec!["checkout".to_string()],
      created: "2024-05-01T10:00:00.000+0000".to_string(),
      updated: "2024-05-02T10:00:00.000+0000".to_string(),
      comments: vec![Comment {
        author: "Bo Lima".to_string(),
        body: "Reproduced on staging".to_string(),
        created: "2024-05-02T09:00:00.000+0000".to_string(),
      }],
    }
  }

  #[tokio::test]
  async fn test_returns_issue_with_comments() {
    let mut fake = FakeJira::new();
    fake.issues.insert("ODPP-1097".to_string(), detailed("ODPP-1097"));
    let (executor, _) = executor(fake);

    let issue = executor
      .get_issue(GetIssueArgs {
        issue_key: " odpp-1097 ".to_string(),
      })
      .await
      .unwrap();
    assert_eq!(issue.key, "ODPP-1097");
    assert_eq!(issue.comments.len(), 1);
  }

  #[tokio::test]
  async fn test_missing_issue_is_upstream_error() {
    let (executor, _) = executor(FakeJira::new());
    let err = executor
      .get_issue(GetIssueArgs {
        issue_key: "ODPP-1".to_string(),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, AssistantError::Upstream(ref m) if m.contains("404")));
  }

  #[tokio::test]
  async fn test_blank_key_is_rejected() {
    let (executor, backend) = executor(FakeJira::new());
    let err = executor.get_issue(GetIssueArgs::default()).await.unwrap_err();
    assert_eq!(err, AssistantError::MissingArgument("issue_key"));
    assert!(backend.calls().is_empty());
  }
}
