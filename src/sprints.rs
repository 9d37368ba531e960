use std::collections::HashSet;

use crate::error::AssistantError;
use crate::jira::types::{Sprint, SprintState};

/// Fail unless every requested id belongs to one of `available`.
pub fn validate_sprint_ids(requested: &[u64], available: &[Sprint]) -> Result<(), AssistantError> {
  let mut seen = HashSet::new();
  let invalid: Vec<u64> = requested
    .iter()
    .copied()
    .filter(|id| !available.iter().any(|s| s.id == *id))
    .filter(|id| seen.insert(*id))
    .collect();

  if invalid.is_empty() {
    Ok(())
  } else {
    Err(AssistantError::InvalidSprintIds(invalid))
  }
}

/// Sprint used when the caller names none: the active one, else the first listed.
pub fn default_sprint(available: &[Sprint]) -> Option<&Sprint> {
  available
    .iter()
    .find(|s| s.state == SprintState::Active)
    .or_else(|| available.first())
}

/// Display name for a sprint id, falling back to "Sprint {id}".
pub fn sprint_label(id: u64, available: &[Sprint]) -> String {
  available
    .iter()
    .find(|s| s.id == id)
    .map(|s| s.name.clone())
    .unwrap_or_else(|| format!("Sprint {}", id))
}
