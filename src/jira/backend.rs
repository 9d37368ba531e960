//! Backend capability consumed by the fact cache and the tool executor.

use async_trait::async_trait;
use color_eyre::Result;

use super::types::{
  BoardInfo, CreatedIssue, Issue, NewIssue, Sprint, SprintIssue, SprintStateFilter, Transition,
};

#[async_trait]
pub trait JiraBackend: Send + Sync {
  /// Most recent sprints first, at most `limit` of them.
  async fn list_sprints(
    &self,
    board_id: u64,
    state: SprintStateFilter,
    limit: usize,
  ) -> Result<Vec<Sprint>>;

  async fn get_sprint_issues(&self, sprint_id: u64) -> Result<Vec<SprintIssue>>;

  async fn get_board_info(&self, board_id: u64) -> Result<BoardInfo>;

  async fn get_issue(&self, key: &str) -> Result<Issue>;

  async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue>;

  async fn move_issues_to_sprint(&self, sprint_id: u64, issue_keys: &[String]) -> Result<()>;

  async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>>;

  async fn transition_issue(&self, issue_key: &str, transition_id: &str) -> Result<()>;
}
