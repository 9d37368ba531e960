//! Matching free-text person references against the team roster.

use crate::error::AssistantError;
use crate::jira::types::TeamMember;

/// Roster members matching `input`, in roster order.
///
/// Every whitespace-separated token must appear in the member's name or
/// email. When nobody matches all tokens, members matching any token are
/// returned instead.
pub fn match_members<'a>(input: &str, roster: &'a [TeamMember]) -> Vec<&'a TeamMember> {
  let input = input.trim().to_lowercase();
  let tokens: Vec<&str> = input.split_whitespace().collect();
  if tokens.is_empty() {
    return Vec::new();
  }

  let token_matches = |member: &TeamMember, token: &str| {
    member.name.to_lowercase().contains(token) || member.email.to_lowercase().contains(token)
  };

  let all: Vec<&TeamMember> = roster
    .iter()
    .filter(|m| tokens.iter().all(|t| token_matches(*m, *t)))
    .collect();
  if !all.is_empty() {
    return all;
  }

  roster
    .iter()
    .filter(|m| tokens.iter().any(|t| token_matches(*m, *t)))
    .collect()
}

/// Resolve a name or email to an email address.
///
/// Anything containing `@` is taken as an email as-is. Otherwise the first
/// match wins, and an unmatched input is echoed back lower-cased.
pub fn resolve_email(input: &str, roster: &[TeamMember]) -> String {
  if input.contains('@') {
    return input.to_lowercase();
  }
  match match_members(input, roster).first() {
    Some(member) => member.email.to_lowercase(),
    None => input.to_lowercase(),
  }
}

/// Like [`resolve_email`], but failing unless exactly one member matches.
pub fn resolve_email_strict(input: &str, roster: &[TeamMember]) -> Result<String, AssistantError> {
  if input.contains('@') {
    return Ok(input.to_lowercase());
  }
  match match_members(input, roster).as_slice() {
    [] => Err(AssistantError::PersonNotFound {
      input: input.to_string(),
      roster: roster.iter().map(|m| m.name.clone()).collect(),
    }),
    [member] => Ok(member.email.to_lowercase()),
    many => Err(AssistantError::AmbiguousPerson {
      input: input.to_string(),
      candidates: many.iter().map(|m| m.name.clone()).collect(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn roster() -> Vec<TeamMember> {
    vec![
      TeamMember {
        name: "John Smith".to_string(),
        email: "js@x.com".to_string(),
      },
      TeamMember {
        name: "Johnny Lee".to_string(),
        email: "jl@x.com".to_string(),
      },
    ]
  }

  #[test]
  fn test_email_input_is_lowercased_without_lookup() {
    assert_eq!(resolve_email("Someone@Elsewhere.COM", &[]), "someone@elsewhere.com");
    assert_eq!(
      resolve_email_strict("Someone@Elsewhere.COM", &[]).unwrap(),
      "someone@elsewhere.com"
    );
  }

  #[test]
  fn test_shared_token_matches_both_in_roster_order() {
    let roster = roster();
    let matches = match_members("john", &roster);
    assert_eq!(matches.len(), 2);
    assert_eq!(resolve_email("john", &roster), "js@x.com");
  }

  #[test]
  fn test_strict_reports_ambiguity_with_names() {
    let err = resolve_email_strict("john", &roster()).unwrap_err();
    assert_eq!(
      err,
      AssistantError::AmbiguousPerson {
        input: "john".to_string(),
        candidates: vec!["John Smith".to_string(), "Johnny Lee".to_string()],
      }
    );
  }

  #[test]
  fn test_all_tokens_pass_wins_over_any_token_pass() {
    let roster = roster();
    let matches = match_members("John Smith", &roster);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].email, "js@x.com");
    assert_eq!(resolve_email_strict("JOHN smith", &roster).unwrap(), "js@x.com");
  }

  #[test]
  fn test_any_token_fallback() {
    let roster = roster();
    // "smith" alone is unique; "Smith Doe" only matches via the fallback pass
    assert_eq!(resolve_email("smith", &roster), "js@x.com");
    let matches = match_members("Smith Doe", &roster);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].email, "js@x.com");
  }

  #[test]
  fn test_unmatched_input_is_echoed() {
    assert_eq!(resolve_email("Maria", &roster()), "maria");
  }

  #[test]
  fn test_strict_not_found_lists_roster() {
    let err = resolve_email_strict("Maria", &roster()).unwrap_err();
    assert_eq!(
      err,
      AssistantError::PersonNotFound {
        input: "Maria".to_string(),
        roster: vec!["John Smith".to_string(), "Johnny Lee".to_string()],
      }
    );
  }

  #[test]
  fn test_matches_on_email() {
    let roster = roster();
    let matches = match_members("jl@", &roster);
    assert_eq!(matches.len(), 1);
  }
}
