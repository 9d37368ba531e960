use std::collections::VecDeque;

use crate::llm::ChatMessage;

/// Recent question/answer exchanges replayed with each new question.
#[derive(Debug, Clone)]
pub struct History {
  exchanges: VecDeque<(String, String)>,
  window: usize,
}

impl History {
  pub fn new(window: usize) -> Self {
    Self {
      exchanges: VecDeque::new(),
      window,
    }
  }

  pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
    self.exchanges.push_back((question.into(), answer.into()));
    while self.exchanges.len() > self.window {
      self.exchanges.pop_front();
    }
  }

  pub fn clear(&mut self) {
    self.exchanges.clear();
  }

  pub fn len(&self) -> usize {
    self.exchanges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.exchanges.is_empty()
  }

  /// System prompt, the kept exchanges, then the new question.
  pub fn messages(&self, system_prompt: String, question: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2 + self.exchanges.len() * 2);
    messages.push(ChatMessage::system(system_prompt));
    for (q, a) in &self.exchanges {
      messages.push(ChatMessage::user(q.clone()));
      messages.push(ChatMessage::assistant(a.clone()));
    }
    messages.push(ChatMessage::user(question));
    messages
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::llm::Role;

  #[test]
  fn test_keeps_only_the_window() {
    let mut history = History::new(2);
    history.record("q1", "a1");
    history.record("q2", "a2");
    history.record("q3", "a3");
    assert_eq!(history.len(), 2);

    let messages = history.messages("sys".to_string(), "q4");
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["sys", "q2", "a2", "q3", "a3", "q4"]);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[5].role, Role::User);
  }

  #[test]
  fn test_zero_window_and_clear() {
    let mut history = History::new(0);
    history.record("q1", "a1");
    assert!(history.is_empty());

    let mut history = History::new(2);
    history.record("q1", "a1");
    history.clear();
    assert_eq!(history.messages("sys".to_string(), "q").len(), 2);
  }
}
