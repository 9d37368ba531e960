use color_eyre::Result;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::agent::{AgentEvent, CompletionStatus, EventSink, History, Orchestrator};
use crate::cache::FactCache;
use crate::commands::{self, CommandKind, Input, COMMANDS};
use crate::event::{Event, EventHandler};

const PROMPT: &str = "pmbot> ";

/// Interactive question/answer session
pub struct App {
  orchestrator: Arc<Orchestrator>,

  /// Exchanges replayed with each question
  history: History,

  /// Event sender for async tasks
  event_tx: Option<mpsc::UnboundedSender<Event>>,

  /// Whether an agent turn is running
  busy: bool,

  /// Whether stdin has closed
  input_closed: bool,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(orchestrator: Orchestrator, context_window: usize) -> Self {
    Self {
      orchestrator: Arc::new(orchestrator),
      history: History::new(context_window),
      event_tx: None,
      busy: false,
      input_closed: false,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut events = EventHandler::new();
    self.event_tx = Some(events.sender());

    println!("pmbot: ask about your sprints, or type /help for commands.");
    print_prompt();

    // Main loop
    while !self.should_quit {
      match events.next().await {
        Some(event) => self.handle_event(event).await,
        None => break,
      }
    }

    Ok(())
  }

  async fn handle_event(&mut self, event: Event) {
    match event {
      Event::Line(line) => self.handle_line(&line).await,
      Event::Eof => {
        self.input_closed = true;
        self.should_quit = !self.busy;
      }
      Event::Agent(agent_event) => {
        if let Some(text) = format_agent_event(&agent_event) {
          print!("{}", text);
          let _ = std::io::stdout().flush();
        }
      }
      Event::TurnFinished { question, result } => {
        self.busy = false;
        match result {
          Ok(outcome) if outcome.status == CompletionStatus::Complete => {
            self.history.record(question, outcome.answer);
          }
          Ok(_) => {}
          Err(message) => eprintln!("Error: {}", message),
        }
        if self.input_closed {
          self.should_quit = true;
        } else {
          print_prompt();
        }
      }
    }
  }

  async fn handle_line(&mut self, line: &str) {
    let input = commands::parse_input(line);
    if self.busy {
      if input == Input::Command(CommandKind::Quit) {
        self.should_quit = true;
      } else {
        println!("Still working on the previous question.");
      }
      return;
    }

    match input {
      Input::Empty => print_prompt(),
      Input::Command(kind) => {
        self.execute_command(kind).await;
        if !self.should_quit {
          print_prompt();
        }
      }
      Input::UnknownCommand(name) => {
        let suggestions: Vec<String> = commands::get_suggestions(&name)
          .iter()
          .map(|c| format!("/{}", c.name))
          .collect();
        if suggestions.is_empty() {
          println!("Unknown command /{}. Type /help for commands.", name);
        } else {
          println!("Unknown command /{}. Did you mean: {}", name, suggestions.join(", "));
        }
        print_prompt();
      }
      Input::Question(question) => self.spawn_turn(question),
    }
  }

  async fn execute_command(&mut self, kind: CommandKind) {
    match kind {
      CommandKind::Help => {
        for cmd in COMMANDS {
          println!("  /{:<10} {}", cmd.name, cmd.description);
        }
      }
      CommandKind::Refresh => {
        let cache = self.orchestrator.tools().cache();
        match cache.force_refresh().await {
          Ok(facts) => println!(
            "Refreshed: {} sprints, {} statuses, {} team members.",
            facts.sprints.len(),
            facts.statuses.len(),
            facts.team_members.len()
          ),
          Err(e) => eprintln!("Error: {}", e),
        }
      }
      CommandKind::Cache => println!("{}", describe_cache(self.orchestrator.tools().cache())),
      CommandKind::Reset => {
        self.history.clear();
        println!("Conversation cleared.");
      }
      CommandKind::Quit => self.should_quit = true,
    }
  }

  fn spawn_turn(&mut self, question: String) {
    let Some(tx) = self.event_tx.clone() else {
      return;
    };
    self.busy = true;
    let orchestrator = Arc::clone(&self.orchestrator);
    let history = self.history.clone();

    tokio::spawn(async move {
      let (agent_tx, mut agent_rx) = mpsc::unbounded_channel();
      let forward_tx = tx.clone();
      let forward = tokio::spawn(async move {
        while let Some(event) = agent_rx.recv().await {
          if forward_tx.send(Event::Agent(event)).is_err() {
            break;
          }
        }
      });

      let result = orchestrator
        .ask(&history, &question, &EventSink::new(agent_tx))
        .await
        .map_err(|e| e.to_string());
      let _ = forward.await;
      let _ = tx.send(Event::TurnFinished { question, result });
    });
  }
}

/// Answer a single question without the REPL.
pub async fn ask_once(orchestrator: &Orchestrator, question: &str) -> Result<()> {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let printer = tokio::spawn(async move {
    while let Some(event) = rx.recv().await {
      if let Some(text) = format_agent_event(&event) {
        print!("{}", text);
        let _ = std::io::stdout().flush();
      }
    }
  });

  let result = orchestrator
    .ask(&History::new(0), question, &EventSink::new(tx))
    .await;
  let _ = printer.await;
  result?;
  Ok(())
}

fn print_prompt() {
  print!("{}", PROMPT);
  let _ = std::io::stdout().flush();
}

fn describe_cache(cache: &FactCache) -> String {
  match cache.info() {
    None => "Nothing cached yet.".to_string(),
    Some(info) if info.valid => format!(
      "Board facts are {} old and expire in {}.",
      human_duration(info.age),
      human_duration(info.expires_in)
    ),
    Some(info) => format!(
      "Board facts are {} old and will be refreshed on the next question.",
      human_duration(info.age)
    ),
  }
}

fn human_duration(d: chrono::Duration) -> String {
  if d.num_days() >= 1 {
    format!("{}d {}h", d.num_days(), d.num_hours() % 24)
  } else if d.num_hours() >= 1 {
    format!("{}h {}m", d.num_hours(), d.num_minutes() % 60)
  } else {
    format!("{}m", d.num_minutes().max(0))
  }
}

/// Terminal rendering of an agent event, if it shows anything.
fn format_agent_event(event: &AgentEvent) -> Option<String> {
  match event {
    AgentEvent::ToolCall { name, arguments } => Some(format!("  > {} {}\n", name, arguments)),
    AgentEvent::ToolError { name, message } => Some(format!("  ! {}: {}\n", name, message)),
    AgentEvent::ToolResult { name, result } if name == "get_sprint_issues" => {
      format_issue_listing(result)
    }
    AgentEvent::ToolResult { .. } => None,
    AgentEvent::StructuredData(payload) => format_structured(payload),
    AgentEvent::Chunk(text) => Some(text.clone()),
    AgentEvent::Done => Some("\n".to_string()),
    AgentEvent::IterationLimit => None,
  }
}

fn format_issue_listing(result: &Value) -> Option<String> {
  let sprints = result.get("sprints")?.as_object()?;
  let mut out = String::new();
  for (name, bucket) in sprints {
    let issues = bucket.get("issues")?.as_array()?;
    out.push_str(&format!("\n{} ({} issues)\n", name, issues.len()));
    for issue in issues {
      let text = |field: &str| issue.get(field).and_then(Value::as_str).unwrap_or("-");
      let points = issue
        .get("story_points")
        .and_then(Value::as_f64)
        .map(|p| format!("{}pt", p))
        .unwrap_or_default();
      out.push_str(&format!(
        "  {:<12} {:<14} {:<20} {:>5}  {}\n",
        text("key"),
        text("status"),
        issue
          .get("assignee_name")
          .and_then(Value::as_str)
          .unwrap_or_else(|| text("assignee")),
        points,
        text("summary")
      ));
    }
  }
  out.push('\n');
  Some(out)
}

fn format_structured(payload: &Value) -> Option<String> {
  if let Some(assignees) = payload.get("assignees").and_then(Value::as_array) {
    let mut out = format!(
      "\n{}: {} points, {} tasks\n",
      payload.get("sprint_name")?.as_str()?,
      payload.get("total_points")?,
      payload.get("total_tasks")?
    );
    for row in assignees {
      out.push_str(&format!(
        "  {:<24} {:>6} pts {:>4} tasks\n",
        row.get("name")?.as_str()?,
        row.get("points")?,
        row.get("tasks")?
      ));
    }
    out.push('\n');
    return Some(out);
  }

  let key = payload.get("key")?.as_str()?;
  let url = payload.get("url")?.as_str()?;
  Some(format!("\nCreated {}: {}\n\n", key, url))
}
