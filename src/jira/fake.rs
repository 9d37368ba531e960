//! In-memory backend for tests.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::Mutex;

use super::backend::JiraBackend;
use super::types::{
  BoardInfo, CreatedIssue, Issue, NewIssue, Sprint, SprintIssue, SprintState, SprintStateFilter,
  Transition,
};

pub struct FakeJira {
  /// Newest first, as the real client returns them
  pub sprints: Vec<Sprint>,
  pub sprint_issues: HashMap<u64, Vec<SprintIssue>>,
  pub issues: HashMap<String, Issue>,
  pub board: BoardInfo,
  pub transitions: Vec<Transition>,
  pub failing_sprints: Vec<u64>,
  calls: Mutex<Vec<String>>,
  created: Mutex<Vec<NewIssue>>,
}

impl FakeJira {
  pub fn new() -> Self {
    Self {
      sprints: Vec::new(),
      sprint_issues: HashMap::new(),
      issues: HashMap::new(),
      board: BoardInfo {
        id: 1,
        name: "ODPP board".to_string(),
        board_type: "scrum".to_string(),
        project_key: "ODPP".to_string(),
        project_name: "Online Drugstore".to_string(),
      },
      transitions: Vec::new(),
      failing_sprints: Vec::new(),
      calls: Mutex::new(Vec::new()),
      created: Mutex::new(Vec::new()),
    }
  }

  pub fn with_sprint(mut self, id: u64, name: &str, state: SprintState) -> Self {
    self.sprints.push(sprint(id, name, state));
    self
  }

  pub fn with_issues(mut self, sprint_id: u64, issues: Vec<SprintIssue>) -> Self {
    self.sprint_issues.insert(sprint_id, issues);
    self
  }

  pub fn with_transitions(mut self, names: &[&str]) -> Self {
    self.transitions = names
      .iter()
      .enumerate()
      .map(|(i, name)| Transition {
        id: (i + 11).to_string(),
        name: name.to_string(),
      })
      .collect();
    self
  }

  /// Every backend call made so far, e.g. `list_sprints(all,20)`
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub fn calls_to(&self, prefix: &str) -> usize {
    self
      .calls()
      .iter()
      .filter(|c| c.starts_with(prefix))
      .count()
  }

  pub fn created(&self) -> Vec<NewIssue> {
    self.created.lock().unwrap().clone()
  }

  fn record(&self, call: String) {
    self.calls.lock().unwrap().push(call);
  }
}

pub fn sprint(id: u64, name: &str, state: SprintState) -> Sprint {
  Sprint {
    id,
    name: name.to_string(),
    state,
    start_date: None,
    end_date: None,
    goal: None,
  }
}

pub fn issue(key: &str, status: &str, assignee: Option<(&str, &str)>, points: Option<f64>) -> SprintIssue {
  SprintIssue {
    key: key.to_string(),
    summary: format!("Work on {}", key),
    status: status.to_string(),
    issue_type: "Story".to_string(),
    assignee: assignee.map(|(email, _)| email.to_string()),
    assignee_display_name: assignee.map(|(_, name)| name.to_string()),
    story_points: points,
  }
}

#[async_trait]
impl JiraBackend for FakeJira {
  async fn list_sprints(
    &self,
    board_id: u64,
    state: SprintStateFilter,
    limit: usize,
  ) -> Result<Vec<Sprint>> {
    let label = match state {
      SprintStateFilter::All => "all".to_string(),
      SprintStateFilter::Only(s) => s.to_string(),
    };
    self.record(format!("list_sprints({},{},{})", board_id, label, limit));
    Ok(
      self
        .sprints
        .iter()
        .filter(|s| match state {
          SprintStateFilter::All => true,
          SprintStateFilter::Only(wanted) => s.state == wanted,
        })
        .take(limit)
        .cloned()
        .collect(),
    )
  }

  async fn get_sprint_issues(&self, sprint_id: u64) -> Result<Vec<SprintIssue>> {
    self.record(format!("get_sprint_issues({})", sprint_id));
    if self.failing_sprints.contains(&sprint_id) {
      return Err(eyre!("HTTP 500: sprint {} unavailable", sprint_id));
    }
    Ok(
      self
        .sprint_issues
        .get(&sprint_id)
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn get_board_info(&self, board_id: u64) -> Result<BoardInfo> {
    self.record(format!("get_board_info({})", board_id));
    Ok(self.board.clone())
  }

  async fn get_issue(&self, key: &str) -> Result<Issue> {
    self.record(format!("get_issue({})", key));
    self
      .issues
      .get(key)
      .cloned()
      .ok_or_else(|| eyre!("HTTP 404: Issue {} does not exist", key))
  }

  async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
    self.record(format!("create_issue({})", issue.summary));
    let mut created = self.created.lock().unwrap();
    created.push(issue.clone());
    let key = format!("{}-{}", issue.project_key, 100 + created.len());
    Ok(CreatedIssue {
      url: format!("https://jira.test/browse/{}", key),
      key,
    })
  }

  async fn move_issues_to_sprint(&self, sprint_id: u64, issue_keys: &[String]) -> Result<()> {
    self.record(format!(
      "move_issues_to_sprint({},{})",
      sprint_id,
      issue_keys.join(",")
    ));
    Ok(())
  }

  async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
    self.record(format!("get_transitions({})", issue_key));
    Ok(self.transitions.clone())
  }

  async fn transition_issue(&self, issue_key: &str, transition_id: &str) -> Result<()> {
    self.record(format!("transition_issue({},{})", issue_key, transition_id));
    Ok(())
  }
}
