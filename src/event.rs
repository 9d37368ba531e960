use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::agent::{AgentEvent, AgentOutcome};

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Line typed at the prompt
  Line(String),
  /// Standard input closed
  Eof,
  /// Progress of the running agent turn
  Agent(AgentEvent),
  /// Agent turn finished, successfully or not
  TurnFinished {
    question: String,
    result: Result<AgentOutcome, String>,
  },
}

/// Event handler that merges stdin lines with events sent by background tasks
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn stdin reader
    let stdin_tx = tx.clone();
    tokio::spawn(async move {
      let mut lines = BufReader::new(tokio::io::stdin()).lines();
      loop {
        let event = match lines.next_line().await {
          Ok(Some(line)) => Event::Line(line),
          Ok(None) | Err(_) => Event::Eof,
        };
        let eof = matches!(event, Event::Eof);
        if stdin_tx.send(event).is_err() || eof {
          break;
        }
      }
    });

    Self { tx, rx }
  }

  /// Sender for background tasks to report back on
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
