use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AssistantError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub jira: JiraConfig,
  #[serde(default)]
  pub llm: LlmConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
  /// Auto-detect based on URL: .atlassian.net = cloud, else on-premise
  #[default]
  Auto,
  /// Jira Cloud - uses Basic auth (email + API token as password)
  Cloud,
  /// Jira On-premise - uses Bearer auth (PAT)
  Onpremise,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraConfig {
  #[serde(default = "default_jira_url")]
  pub url: String,
  #[serde(default)]
  pub email: String,
  /// Board whose sprints, statuses and team the assistant works against
  pub board_id: Option<u64>,
  /// Project new issues are created in (falls back to the board's project)
  pub project_key: Option<String>,
  /// Custom field holding story point estimates
  #[serde(default = "default_story_points_field")]
  pub story_points_field: String,
  /// Status a freshly created issue starts in
  #[serde(default = "default_initial_status")]
  pub initial_status: String,
  #[serde(default = "default_issue_type")]
  pub default_issue_type: String,
  #[serde(default)]
  pub auth_type: AuthType,
}

impl JiraConfig {
  /// Board id, required by every tool that reads sprint data.
  pub fn board_id(&self) -> std::result::Result<u64, AssistantError> {
    self
      .board_id
      .ok_or(AssistantError::ConfigMissing("DEFAULT_BOARD_ID"))
  }
}

impl Default for JiraConfig {
  fn default() -> Self {
    Self {
      url: default_jira_url(),
      email: String::new(),
      board_id: None,
      project_key: None,
      story_points_field: default_story_points_field(),
      initial_status: default_initial_status(),
      default_issue_type: default_issue_type(),
      auth_type: AuthType::Auto,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
  /// Base URL of an OpenAI-compatible chat completions API
  #[serde(default = "default_llm_url")]
  pub url: String,
  #[serde(default = "default_llm_model")]
  pub model: String,
  #[serde(default = "default_max_output_tokens")]
  pub max_output_tokens: u32,
  #[serde(default = "default_max_tool_iterations")]
  pub max_tool_iterations: usize,
  /// Number of previous question/answer exchanges sent with each question
  #[serde(default = "default_context_window")]
  pub context_window: usize,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      url: default_llm_url(),
      model: default_llm_model(),
      max_output_tokens: default_max_output_tokens(),
      max_tool_iterations: default_max_tool_iterations(),
      context_window: default_context_window(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_ttl_days")]
  pub ttl_days: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_days: default_ttl_days(),
    }
  }
}

fn default_jira_url() -> String {
  "https://your-domain.atlassian.net".to_string()
}

fn default_story_points_field() -> String {
  "customfield_10016".to_string()
}

fn default_initial_status() -> String {
  "Backlog".to_string()
}

fn default_issue_type() -> String {
  "Story".to_string()
}

fn default_llm_url() -> String {
  "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
  "llama-3.3-70b-versatile".to_string()
}

fn default_max_output_tokens() -> u32 {
  4096
}

fn default_max_tool_iterations() -> usize {
  10
}

fn default_context_window() -> usize {
  2
}

fn default_ttl_days() -> i64 {
  7
}

impl Config {
  /// Load configuration from file and environment.
  ///
  /// File search order:
  /// 1. Explicit path if provided
  /// 2. ./pmbot.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/pmbot/config.yaml
  ///
  /// A missing file is not an error; environment variables are applied on top
  /// of whatever was found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };
    config.apply_env(|name| std::env::var(name).ok())?;
    config.cache_ttl()?;

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("pmbot.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("pmbot").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Override file values with environment variables.
  fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(url) = var("JIRA_BASE_URL") {
      self.jira.url = url;
    }
    if let Some(email) = var("JIRA_EMAIL") {
      self.jira.email = email;
    }
    // Blank values count as unset; tools report the missing board when they need it
    if let Some(board) = var("DEFAULT_BOARD_ID").filter(|v| !v.trim().is_empty()) {
      let id = board
        .trim()
        .parse()
        .map_err(|_| eyre!("DEFAULT_BOARD_ID must be a number, got {:?}", board))?;
      self.jira.board_id = Some(id);
    }
    if let Some(project) = var("DEFAULT_PROJECT_KEY").filter(|v| !v.trim().is_empty()) {
      self.jira.project_key = Some(project.trim().to_string());
    }
    if let Some(field) = var("JIRA_STORY_POINTS_FIELD") {
      self.jira.story_points_field = field;
    }
    if let Some(url) = var("LLM_API_URL") {
      self.llm.url = url;
    }
    if let Some(model) = var("LLM_MODEL") {
      self.llm.model = model;
    }
    Ok(())
  }

  pub fn cache_ttl(&self) -> Result<chrono::Duration> {
    chrono::Duration::try_days(self.cache.ttl_days)
      .ok_or_else(|| eyre!("cache.ttl_days is out of range: {}", self.cache.ttl_days))
  }

  /// Get the Jira API token from environment variables.
  ///
  /// Checks PMBOT_JIRA_TOKEN first, then JIRA_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("PMBOT_JIRA_TOKEN")
      .or_else(|_| std::env::var("JIRA_API_TOKEN"))
      .map_err(|_| {
        eyre!("Jira API token not found. Set PMBOT_JIRA_TOKEN or JIRA_API_TOKEN environment variable.")
      })
  }

  /// Get the language model API key from environment variables.
  ///
  /// Checks PMBOT_LLM_API_KEY first, then GROQ_API_KEY as fallback.
  pub fn get_llm_api_key() -> Option<String> {
    std::env::var("PMBOT_LLM_API_KEY")
      .or_else(|_| std::env::var("GROQ_API_KEY"))
      .ok()
  }
}
