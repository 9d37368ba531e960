//! Process-wide snapshot of board facts: sprints, statuses and team roster.

use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use crate::error::AssistantError;
use crate::jira::types::{Sprint, SprintState, SprintStateFilter, TeamMember};
use crate::jira::JiraBackend;

/// How many recent sprints are listed on refresh
const RECENT_SPRINTS: usize = 20;
/// How many recent sprints are scanned for statuses and assignees
const SCANNED_SPRINTS: usize = 5;

/// One refresh worth of facts. Never mutated once built.
#[derive(Debug, Clone)]
pub struct CachedFacts {
  /// Active and closed sprints, most recent first
  pub sprints: Vec<Sprint>,
  pub statuses: BTreeSet<String>,
  /// Sorted by display name
  pub team_members: Vec<TeamMember>,
  pub fetched_at: DateTime<Utc>,
}

/// Age and remaining lifetime of the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheInfo {
  pub valid: bool,
  pub age: Duration,
  pub expires_in: Duration,
}

/// Time-boxed cache of board facts.
///
/// Readers get an `Arc` to the current snapshot. An expired snapshot is
/// replaced wholesale by the next reader. Refreshes are not de-duplicated:
/// concurrent readers on a stale cache each refresh and the last one to
/// finish wins.
pub struct FactCache {
  backend: Arc<dyn JiraBackend>,
  board_id: Option<u64>,
  ttl: Duration,
  clock: Arc<dyn Clock>,
  snapshot: RwLock<Option<Arc<CachedFacts>>>,
}

impl FactCache {
  pub fn new(backend: Arc<dyn JiraBackend>, board_id: Option<u64>, ttl: Duration) -> Self {
    Self {
      backend,
      board_id,
      ttl,
      clock: Arc::new(SystemClock),
      snapshot: RwLock::new(None),
    }
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  fn is_valid(&self, facts: &CachedFacts) -> bool {
    self.clock.now() - facts.fetched_at < self.ttl
  }

  fn current(&self) -> Option<Arc<CachedFacts>> {
    let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
    guard.as_ref().filter(|facts| self.is_valid(facts)).cloned()
  }

  /// Current snapshot, refreshing it first if missing or expired.
  pub async fn get_all(&self) -> Result<Arc<CachedFacts>, AssistantError> {
    if let Some(facts) = self.current() {
      debug!(fetched_at = %facts.fetched_at, "fact cache hit");
      return Ok(facts);
    }
    self.refresh().await
  }

  pub async fn sprints(&self) -> Result<Vec<Sprint>, AssistantError> {
    Ok(self.get_all().await?.sprints.clone())
  }

  pub async fn statuses(&self) -> Result<Vec<String>, AssistantError> {
    Ok(self.get_all().await?.statuses.iter().cloned().collect())
  }

  pub async fn team_members(&self) -> Result<Vec<TeamMember>, AssistantError> {
    Ok(self.get_all().await?.team_members.clone())
  }

  /// Refresh regardless of the current snapshot's age.
  pub async fn force_refresh(&self) -> Result<Arc<CachedFacts>, AssistantError> {
    self.refresh().await
  }

  /// Age of the current snapshot, if any was ever fetched.
  pub fn info(&self) -> Option<CacheInfo> {
    let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
    let facts = guard.as_ref()?;
    let age = self.clock.now() - facts.fetched_at;
    Some(CacheInfo {
      valid: age < self.ttl,
      age,
      expires_in: self.ttl - age,
    })
  }

  async fn refresh(&self) -> Result<Arc<CachedFacts>, AssistantError> {
    let board_id = self
      .board_id
      .ok_or(AssistantError::ConfigMissing("DEFAULT_BOARD_ID"))?;

    info!(board_id, "refreshing fact cache");
    let (all_sprints, (statuses, team_members)) = tokio::try_join!(
      self
        .backend
        .list_sprints(board_id, SprintStateFilter::All, RECENT_SPRINTS),
      self.scan_statuses_and_team(board_id),
    )?;

    let sprints: Vec<Sprint> = all_sprints
      .into_iter()
      .filter(|s| matches!(s.state, SprintState::Active | SprintState::Closed))
      .collect();

    let facts = Arc::new(CachedFacts {
      sprints,
      statuses,
      team_members,
      fetched_at: self.clock.now(),
    });
    info!(
      sprints = facts.sprints.len(),
      statuses = facts.statuses.len(),
      team = facts.team_members.len(),
      "fact cache refreshed"
    );

    let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(Arc::clone(&facts));
    Ok(facts)
  }

  /// Collect statuses and assignees seen on the most recent sprints' issues.
  async fn scan_statuses_and_team(
    &self,
    board_id: u64,
  ) -> color_eyre::Result<(BTreeSet<String>, Vec<TeamMember>)> {
    let sprints = self
      .backend
      .list_sprints(board_id, SprintStateFilter::All, SCANNED_SPRINTS)
      .await?;

    let per_sprint = try_join_all(
      sprints
        .iter()
        .map(|sprint| self.backend.get_sprint_issues(sprint.id)),
    )
    .await?;

    let mut statuses = BTreeSet::new();
    let mut members: HashMap<String, String> = HashMap::new();
    for issue in per_sprint.into_iter().flatten() {
      if !issue.status.is_empty() {
        statuses.insert(issue.status);
      }
      if let (Some(email), Some(name)) = (issue.assignee, issue.assignee_display_name) {
        if !email.is_empty() && !name.is_empty() {
          members.insert(email, name);
        }
      }
    }

    let mut team_members: Vec<TeamMember> = members
      .into_iter()
      .map(|(email, name)| TeamMember { name, email })
      .collect();
    team_members.sort_by(|a, b| {
      a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.email.cmp(&b.email))
    });

    Ok((statuses, team_members))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::clock::ManualClock;
  use crate::jira::fake::{issue, FakeJira};
  use chrono::TimeZone;

  fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
  }

  fn fake() -> FakeJira {
    FakeJira::new()
      .with_sprint(30, "Sprint 26", SprintState::Future)
      .with_sprint(29, "Sprint 25", SprintState::Active)
      .with_sprint(28, "Sprint 24", SprintState::Closed)
      .with_issues(
        29,
        vec![
          issue("ODPP-3", "In QA", Some(("bo@x.com", "Bo Lima")), Some(2.0)),
          issue("ODPP-4", "", Some(("ana@x.com", "Ana")), None),
        ],
      )
      .with_issues(
        28,
        vec![
          issue("ODPP-1", "Done", Some(("ana@x.com", "Ana Souza")), Some(3.0)),
          issue("ODPP-2", "Backlog", None, None),
        ],
      )
  }

  fn cache(backend: Arc<FakeJira>, clock: Arc<ManualClock>) -> FactCache {
    FactCache::new(backend, Some(1), Duration::days(7)).with_clock(clock)
  }

  #[tokio::test]
  async fn test_refresh_builds_snapshot() {
    let backend = Arc::new(fake());
    let cache = cache(backend.clone(), Arc::new(ManualClock::new(start())));

    let facts = cache.get_all().await.unwrap();

    let ids: Vec<u64> = facts.sprints.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![29, 28]);
    let statuses: Vec<&str> = facts.statuses.iter().map(String::as_str).collect();
    assert_eq!(statuses, vec!["Backlog", "Done", "In QA"]);
    // ana@x.com seen twice; the later sprint in scan order wins
    assert_eq!(
      facts.team_members,
      vec![
        TeamMember {
          name: "Ana Souza".into(),
          email: "ana@x.com".into()
        },
        TeamMember {
          name: "Bo Lima".into(),
          email: "bo@x.com".into()
        },
      ]
    );
    assert_eq!(facts.fetched_at, start());
  }

  #[tokio::test]
  async fn test_reads_within_ttl_do_not_hit_backend() {
    let backend = Arc::new(fake());
    let clock = Arc::new(ManualClock::new(start()));
    let cache = cache(backend.clone(), clock.clone());

    cache.get_all().await.unwrap();
    let calls_after_fill = backend.calls().len();

    clock.advance(Duration::days(7) - Duration::milliseconds(1));
    cache.sprints().await.unwrap();
    cache.statuses().await.unwrap();
    cache.team_members().await.unwrap();

    assert_eq!(backend.calls().len(), calls_after_fill);
  }

  #[tokio::test]
  async fn test_expired_snapshot_triggers_one_refresh() {
    let backend = Arc::new(fake());
    let clock = Arc::new(ManualClock::new(start()));
    let cache = cache(backend.clone(), clock.clone());

    cache.get_all().await.unwrap();
    assert_eq!(backend.calls_to("list_sprints(1,all,20)"), 1);
    assert_eq!(backend.calls_to("list_sprints(1,all,5)"), 1);

    clock.advance(Duration::days(7) + Duration::milliseconds(1));
    let facts = cache.get_all().await.unwrap();
    cache.get_all().await.unwrap();

    assert_eq!(backend.calls_to("list_sprints(1,all,20)"), 2);
    assert_eq!(backend.calls_to("list_sprints(1,all,5)"), 2);
    assert_eq!(facts.fetched_at, start() + Duration::days(7) + Duration::milliseconds(1));
  }

  #[tokio::test]
  async fn test_force_refresh_ignores_ttl() {
    let backend = Arc::new(fake());
    let cache = cache(backend.clone(), Arc::new(ManualClock::new(start())));

    cache.get_all().await.unwrap();
    cache.force_refresh().await.unwrap();

    assert_eq!(backend.calls_to("list_sprints(1,all,20)"), 2);
  }

  #[tokio::test]
  async fn test_missing_board_is_fatal() {
    let backend = Arc::new(fake());
    let cache = FactCache::new(backend.clone(), None, Duration::days(7));

    let err = cache.get_all().await.unwrap_err();
    assert!(err.is_fatal());
    assert!(backend.calls().is_empty());
  }

  #[tokio::test]
  async fn test_info_reports_age() {
    let backend = Arc::new(fake());
    let clock = Arc::new(ManualClock::new(start()));
    let cache = cache(backend, clock.clone());

    assert!(cache.info().is_none());
    cache.get_all().await.unwrap();
    clock.advance(Duration::days(2));

    let info = cache.info().unwrap();
    assert!(info.valid);
    assert_eq!(info.age, Duration::days(2));
    assert_eq!(info.expires_in, Duration::days(5));

    clock.advance(Duration::days(5));
    assert!(!cache.info().unwrap().valid);
  }
}
