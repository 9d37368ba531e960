use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{AuthType, Config};
use crate::jira::api_types::{
  ApiBoard, ApiCreatedIssue, ApiIssue, ApiSprintIssuesResponse, ApiSprintsResponse,
  ApiTransitionsResponse, ApiUser,
};
use crate::jira::backend::JiraBackend;
use crate::jira::browse_url;
use crate::jira::types::{
  BoardInfo, CreatedIssue, Issue, NewIssue, Sprint, SprintIssue, SprintStateFilter, Transition,
};

const PAGE_SIZE: u64 = 50;

/// Jira API client wrapper
#[derive(Clone)]
pub struct JiraClient {
  client: gouqi::r#async::Jira,
  base_url: String,
  story_points_field: String,
}

impl JiraClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;

    let auth_type = match config.jira.auth_type {
      AuthType::Auto if config.jira.url.contains(".atlassian.net") => AuthType::Cloud,
      AuthType::Auto => AuthType::Onpremise,
      other => other,
    };
    let credentials = match auth_type {
      AuthType::Onpremise => gouqi::Credentials::Bearer(token),
      _ => gouqi::Credentials::Basic(config.jira.email.clone(), token),
    };

    let client = gouqi::r#async::Jira::new(&config.jira.url, credentials)
      .map_err(|e| eyre!("Failed to create Jira client: {}", e))?;

    Ok(Self {
      client,
      base_url: config.jira.url.clone(),
      story_points_field: config.jira.story_points_field.clone(),
    })
  }

  /// Find the account to assign issues to from an email address
  async fn find_user(&self, email: &str) -> Result<ApiUser> {
    let query: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
    let endpoint = format!("/user/search?query={}", query);

    let users: Vec<ApiUser> = self
      .client
      .get("api", &endpoint)
      .await
      .map_err(|e| eyre!("Failed to look up user {}: {}", email, e))?;

    let mut users = users.into_iter();
    let first = users
      .next()
      .ok_or_else(|| eyre!("No Jira user found for {}", email))?;
    if first
      .email_address
      .as_deref()
      .is_some_and(|e| e.eq_ignore_ascii_case(email))
    {
      return Ok(first);
    }
    Ok(
      users
        .find(|u| {
          u.email_address
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
        .unwrap_or(first),
    )
  }
}

#[async_trait]
impl JiraBackend for JiraClient {
  async fn list_sprints(
    &self,
    board_id: u64,
    state: SprintStateFilter,
    limit: usize,
  ) -> Result<Vec<Sprint>> {
    let mut all_sprints = Vec::new();
    let mut start_at = 0u64;

    loop {
      let mut endpoint = format!(
        "/board/{}/sprint?startAt={}&maxResults={}",
        board_id, start_at, PAGE_SIZE
      );
      if let SprintStateFilter::Only(state) = state {
        endpoint.push_str(&format!("&state={}", state));
      }

      let response: ApiSprintsResponse = self
        .client
        .get("agile", &endpoint)
        .await
        .map_err(|e| eyre!("Failed to list sprints for board {}: {}", board_id, e))?;

      let count = response.values.len() as u64;
      all_sprints.extend(response.values.into_iter().map(Sprint::from));

      if response.is_last || count == 0 {
        break;
      }
      start_at += count;
    }

    // Jira returns sprints oldest first
    all_sprints.reverse();
    all_sprints.truncate(limit);
    Ok(all_sprints)
  }

  async fn get_sprint_issues(&self, sprint_id: u64) -> Result<Vec<SprintIssue>> {
    let mut all_issues = Vec::new();
    let mut start_at = 0u64;

    loop {
      let endpoint = format!(
        "/sprint/{}/issue?startAt={}&maxResults={}&fields=summary,status,issuetype,assignee,{}",
        sprint_id, start_at, PAGE_SIZE, self.story_points_field
      );

      let response: ApiSprintIssuesResponse = self
        .client
        .get("agile", &endpoint)
        .await
        .map_err(|e| eyre!("Failed to get issues for sprint {}: {}", sprint_id, e))?;

      let issues_count = response.issues.len() as u64;
      all_issues.extend(
        response
          .issues
          .into_iter()
          .map(|issue| issue.into_sprint_issue(&self.story_points_field)),
      );

      if issues_count == 0 || start_at + issues_count >= response.total {
        break;
      }
      start_at += issues_count;
    }

    Ok(all_issues)
  }

  async fn get_board_info(&self, board_id: u64) -> Result<BoardInfo> {
    let endpoint = format!("/board/{}", board_id);

    let board: ApiBoard = self
      .client
      .get("agile", &endpoint)
      .await
      .map_err(|e| eyre!("Failed to get board {}: {}", board_id, e))?;

    Ok(board.into())
  }

  async fn get_issue(&self, key: &str) -> Result<Issue> {
    let endpoint = format!(
      "/issue/{}?fields=summary,description,status,issuetype,priority,assignee,reporter,labels,created,updated,comment,{}",
      key, self.story_points_field
    );

    let issue: ApiIssue = self
      .client
      .get("api", &endpoint)
      .await
      .map_err(|e| eyre!("Failed to get issue {}: {}", key, e))?;

    Ok(issue.into_full(&self.story_points_field))
  }

  async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
    let mut fields = serde_json::Map::new();
    fields.insert("project".into(), json!({ "key": issue.project_key }));
    fields.insert("summary".into(), json!(issue.summary));
    fields.insert("issuetype".into(), json!({ "name": issue.issue_type }));
    if let Some(description) = &issue.description {
      fields.insert("description".into(), json!(description));
    }
    if let Some(points) = issue.story_points {
      fields.insert(self.story_points_field.clone(), json!(points));
    }
    if let Some(email) = &issue.assignee_email {
      let user = self.find_user(email).await?;
      let assignee = match (user.account_id, user.name) {
        (Some(id), _) => json!({ "accountId": id }),
        (None, Some(name)) => json!({ "name": name }),
        (None, None) => return Err(eyre!("Jira user {} has no account id", email)),
      };
      fields.insert("assignee".into(), assignee);
    }

    let created: ApiCreatedIssue = self
      .client
      .post("api", "/issue", json!({ "fields": fields }))
      .await
      .map_err(|e| eyre!("Failed to create issue: {}", e))?;

    debug!(key = %created.key, "created issue");
    Ok(CreatedIssue {
      url: browse_url(&self.base_url, &created.key),
      key: created.key,
    })
  }

  async fn move_issues_to_sprint(&self, sprint_id: u64, issue_keys: &[String]) -> Result<()> {
    let endpoint = format!("/sprint/{}/issue", sprint_id);

    self
      .client
      .post::<Value, _>("agile", &endpoint, json!({ "issues": issue_keys }))
      .await
      .map_err(|e| eyre!("Failed to move issues to sprint {}: {}", sprint_id, e))?;

    Ok(())
  }

  async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
    let endpoint = format!("/issue/{}/transitions", issue_key);

    let response: ApiTransitionsResponse = self
      .client
      .get("api", &endpoint)
      .await
      .map_err(|e| eyre!("Failed to get transitions: {}", e))?;

    Ok(
      response
        .transitions
        .into_iter()
        .map(Transition::from)
        .collect(),
    )
  }

  async fn transition_issue(&self, issue_key: &str, transition_id: &str) -> Result<()> {
    let endpoint = format!("/issue/{}/transitions", issue_key);

    let body = json!({
      "transition": {
        "id": transition_id
      }
    });

    self
      .client
      .post::<Value, _>("api", &endpoint, body)
      .await
      .map_err(|e| eyre!("Failed to execute transition: {}", e))?;

    Ok(())
  }
}
