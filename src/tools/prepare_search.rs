use super::call::PrepareSearchArgs;
use super::executor::{ToolExecutor, BOARD_SPRINT_LIMIT};
use super::results::{BoardSummary, PersonMatch, PrepareSearchResult, SprintRef};
use crate::error::AssistantError;
use crate::jira::types::{Sprint, SprintStateFilter};
use crate::resolve::match_members;
use crate::sprints::{default_sprint, validate_sprint_ids};

impl ToolExecutor {
  /// Resolve the people and sprints a question refers to.
  pub(super) async fn prepare_search(
    &self,
    args: PrepareSearchArgs,
  ) -> Result<PrepareSearchResult, AssistantError> {
    let board_id = self.jira.board_id()?;

    let (board, sprints, team) = tokio::try_join!(
      async {
        self
          .backend
          .get_board_info(board_id)
          .await
          .map_err(AssistantError::from)
      },
      async {
        self
          .backend
          .list_sprints(board_id, SprintStateFilter::All, BOARD_SPRINT_LIMIT)
          .await
          .map_err(AssistantError::from)
      },
      self.cache.team_members(),
    )?;

    let scope: Vec<&Sprint> = if args.sprint_ids.is_empty() {
      default_sprint(&sprints).into_iter().collect()
    } else {
      validate_sprint_ids(&args.sprint_ids, &sprints)?;
      args
        .sprint_ids
        .iter()
        .filter_map(|id| sprints.iter().find(|s| s.id == *id))
        .collect()
    };

    let names: Vec<&str> = args
      .names
      .iter()
      .map(|n| n.trim())
      .filter(|n| !n.is_empty())
      .collect();

    let (team_members, people) = if names.is_empty() {
      (Some(team.iter().map(|m| m.email.clone()).collect()), None)
    } else {
      let people = names
        .iter()
        .map(|name| {
          let emails = match_members(name, &team)
            .into_iter()
            .map(|m| m.email.clone())
            .collect();
          PersonMatch::from_matches(name, emails)
        })
        .collect();
      (None, Some(people))
    };

    Ok(PrepareSearchResult {
      all_team: names.is_empty(),
      team_members,
      people,
      board: BoardSummary::from(&board),
      sprints: scope.into_iter().map(SprintRef::from).collect(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::jira::fake::{issue, FakeJira};
  use crate::jira::types::SprintState;
  use crate::tools::executor::test_support::executor;

  fn fake() -> FakeJira {
    FakeJira::new()
      .with_sprint(31, "Sprint 27", SprintState::Future)
      .with_sprint(30, "Sprint 26", SprintState::Active)
      .with_sprint(29, "Sprint 25", SprintState::Closed)
      .with_issues(
        30,
        vec![
          issue("ODPP-1", "In QA", Some(("js@x.com", "John Smith")), Some(3.0)),
          issue("ODPP-2", "Done", Some(("jl@x.com", "Johnny Lee")), Some(1.0)),
          issue("ODPP-3", "Done", Some(("ana@x.com", "Ana Souza")), None),
        ],
      )
  }

  #[tokio::test]
  async fn test_no_names_means_whole_team_in_active_sprint() {
    let (executor, _) = executor(fake());
    let result = executor
      .prepare_search(PrepareSearchArgs::default())
      .await
      .unwrap();

    assert!(result.all_team);
    assert!(result.people.is_none());
    assert_eq!(
      result.team_members,
      Some(vec![
        "ana@x.com".to_string(),
        "js@x.com".to_string(),
        "jl@x.com".to_string()
      ])
    );
    assert_eq!(result.sprints.len(), 1);
    assert_eq!(result.sprints[0].id, 30);
    assert_eq!(result.board.project_key, "ODPP");
  }

  #[tokio::test]
  async fn test_names_resolve_to_matches() {
    let (executor, _) = executor(fake());
    let result = executor
      .prepare_search(PrepareSearchArgs {
        names: vec!["ana".into(), "john".into(), "maria".into(), " ".into()],
        sprint_ids: vec![29, 30],
      })
      .await
      .unwrap();

    assert!(!result.all_team);
    assert!(result.team_members.is_none());
    let people = result.people.unwrap();
    assert_eq!(people.len(), 3);
    assert_eq!(people[0].resolved_email.as_deref(), Some("ana@x.com"));
    assert_eq!(people[1].possible_matches, vec!["js@x.com", "jl@x.com"]);
    assert!(people[2].not_found);

    let ids: Vec<u64> = result.sprints.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![29, 30]);
  }

  #[tokio::test]
  async fn test_unknown_sprint_ids_are_rejected() {
    let (executor, _) = executor(fake());
    let err = executor
      .prepare_search(PrepareSearchArgs {
        names: Vec::new(),
        sprint_ids: vec![30, 4242],
      })
      .await
      .unwrap_err();
    assert_eq!(err, AssistantError::InvalidSprintIds(vec![4242]));
  }

  #[tokio::test]
  async fn test_board_without_sprints_yields_empty_scope() {
    let (executor, _) = executor(FakeJira::new());
    let result = executor
      .prepare_search(PrepareSearchArgs::default())
      .await
      .unwrap();
    assert!(result.sprints.is_empty());
    assert_eq!(result.team_members, Some(Vec::new()));
  }
}
