//! Issue filtering and ordering for sprint issue listings.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::jira::types::SprintIssue;

/// Status filter as requested by the model.
///
/// `done`, `in_progress` and `todo` are synonyms that match the common
/// English and Portuguese spellings of those workflow states; anything else
/// must equal the issue status, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
  Done,
  InProgress,
  Todo,
  Exact(String),
}

const DONE_PATTERNS: &[&str] = &["done", "concluído", "concluido", "completed"];
const IN_PROGRESS_PATTERNS: &[&str] = &["progress"];
const TODO_PATTERNS: &[&str] = &["backlog", "todo", "to do", "new"];

impl StatusFilter {
  pub fn parse(raw: &str) -> Self {
    match raw.trim().to_lowercase().as_str() {
      "done" => StatusFilter::Done,
      "in_progress" => StatusFilter::InProgress,
      "todo" => StatusFilter::Todo,
      other => StatusFilter::Exact(other.to_string()),
    }
  }

  pub fn matches(&self, status: &str) -> bool {
    let status = status.to_lowercase();
    let contains_any = |patterns: &[&str]| patterns.iter().any(|p| status.contains(p));
    match self {
      StatusFilter::Done => contains_any(DONE_PATTERNS),
      StatusFilter::InProgress => contains_any(IN_PROGRESS_PATTERNS),
      StatusFilter::Todo => contains_any(TODO_PATTERNS),
      StatusFilter::Exact(wanted) => status == *wanted,
    }
  }
}

/// A single predicate over an issue.
#[derive(Debug, Clone)]
pub enum IssueFilter {
  /// Assignee email is one of these (lower-cased)
  Assignee(HashSet<String>),
  /// Status matches any of these
  Status(Vec<StatusFilter>),
  /// Summary contains this (lower-cased)
  Keyword(String),
}

impl IssueFilter {
  pub fn matches(&self, issue: &SprintIssue) -> bool {
    match self {
      IssueFilter::Assignee(emails) => issue
        .assignee
        .as_ref()
        .is_some_and(|email| emails.contains(&email.to_lowercase())),
      IssueFilter::Status(filters) => filters.iter().any(|f| f.matches(&issue.status)),
      IssueFilter::Keyword(keyword) => issue.summary.to_lowercase().contains(keyword),
    }
  }
}

/// Filters applied in sequence; an issue survives only if every filter matches.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
  filters: Vec<IssueFilter>,
}

impl FilterPipeline {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_assignees(mut self, emails: &[String]) -> Self {
    if !emails.is_empty() {
      self.filters.push(IssueFilter::Assignee(
        emails.iter().map(|e| e.to_lowercase()).collect(),
      ));
    }
    self
  }

  pub fn with_statuses(mut self, statuses: &[String]) -> Self {
    if !statuses.is_empty() {
      self.filters.push(IssueFilter::Status(
        statuses.iter().map(|s| StatusFilter::parse(s)).collect(),
      ));
    }
    self
  }

  pub fn with_keyword(mut self, keyword: Option<&str>) -> Self {
    if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
      self.filters.push(IssueFilter::Keyword(keyword.to_lowercase()));
    }
    self
  }

  pub fn len(&self) -> usize {
    self.filters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.filters.is_empty()
  }

  /// Keep matching issues, sorted by key.
  pub fn apply(&self, issues: Vec<SprintIssue>) -> Vec<SprintIssue> {
    let mut issues: Vec<SprintIssue> = issues
      .into_iter()
      .filter(|issue| self.filters.iter().all(|f| f.matches(issue)))
      .collect();
    issues.sort_by(|a, b| compare_issue_keys(&a.key, &b.key));
    issues
  }
}

/// Compare issue keys with numeric runs compared by value, so "ODPP-9" < "ODPP-10".
pub fn compare_issue_keys(a: &str, b: &str) -> Ordering {
  let (left, right) = (chunks(a), chunks(b));
  for (x, y) in left.iter().zip(right.iter()) {
    let ord = match (x, y) {
      (Chunk::Number(x), Chunk::Number(y)) => {
        let (x, y) = (x.trim_start_matches('0'), y.trim_start_matches('0'));
        x.len().cmp(&y.len()).then_with(|| x.cmp(y))
      }
      _ => x.text().to_lowercase().cmp(&y.text().to_lowercase()),
    };
    if ord != Ordering::Equal {
      return ord;
    }
  }
  left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

enum Chunk<'a> {
  Number(&'a str),
  Text(&'a str),
}

impl<'a> Chunk<'a> {
  fn text(&self) -> &'a str {
    match self {
      Chunk::Number(s) | Chunk::Text(s) => *s,
    }
  }
}

/// Split into alternating runs of digits and non-digits.
fn chunks(s: &str) -> Vec<Chunk<'_>> {
  let mut out = Vec::new();
  let mut start = 0;
  let mut in_digits = None;
  for (i, c) in s.char_indices() {
    let digit = c.is_ascii_digit();
    match in_digits {
      Some(prev) if prev != digit => {
        out.push(chunk(&s[start..i], prev));
        start = i;
      }
      _ => {}
    }
    in_digits = Some(digit);
  }
  if let Some(digit) = in_digits {
    out.push(chunk(&s[start..], digit));
  }
  out
}

fn chunk(s: &str, digit: bool) -> Chunk<'_> {
  if digit {
    Chunk::Number(s)
  } else {
    Chunk::Text(s)
  }
}
