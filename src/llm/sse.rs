//! Line-buffered decoder for chat-completions server-sent events.

use serde_json::Value;

/// Turns raw response bytes into content deltas.
///
/// Input is split on `\n`. A trailing line without its newline is held back
/// until the next push (or [`finish`](Self::finish)), so multi-byte
/// characters and JSON payloads split across reads decode intact.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
  pending: Vec<u8>,
  done: bool,
}

impl SseLineDecoder {
  pub fn new() -> Self {
    Self::default()
  }

  /// True once `data: [DONE]` was seen; later input is ignored.
  pub fn is_done(&self) -> bool {
    self.done
  }

  pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
    if self.done {
      return Vec::new();
    }
    self.pending.extend_from_slice(bytes);

    let mut out = Vec::new();
    while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
      let line: Vec<u8> = self.pending.drain(..=pos).collect();
      if let Some(text) = self.decode_line(&line) {
        out.push(text);
      }
      if self.done {
        self.pending.clear();
        break;
      }
    }
    out
  }

  /// Decode whatever is left once the response body ends.
  pub fn finish(&mut self) -> Vec<String> {
    if self.done || self.pending.is_empty() {
      return Vec::new();
    }
    let line = std::mem::take(&mut self.pending);
    self.decode_line(&line).into_iter().collect()
  }

  fn decode_line(&mut self, line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let payload = line.trim_end_matches(['\n', '\r']).strip_prefix("data:")?.trim();
    if payload == "[DONE]" {
      self.done = true;
      return None;
    }

    let value: Value = serde_json::from_str(payload).ok()?;
    let content = value["choices"][0]["delta"]["content"].as_str()?;
    (!content.is_empty()).then(|| content.to_string())
  }
}
