pub mod api_types;
pub mod backend;
pub mod client;
#[cfg(test)]
pub mod fake;
pub mod types;

pub use backend::JiraBackend;
pub use client::JiraClient;

/// Link to an issue in the Jira web UI.
pub fn browse_url(base_url: &str, key: &str) -> String {
  format!("{}/browse/{}", base_url.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_browse_url() {
    assert_eq!(
      browse_url("https://acme.atlassian.net", "ODPP-1"),
      "https://acme.atlassian.net/browse/ODPP-1"
    );
    assert_eq!(
      browse_url("https://jira.acme.com/jira/", "ODPP-1"),
      "https://jira.acme.com/jira/browse/ODPP-1"
    );
  }
}
