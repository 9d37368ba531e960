//! Conversation orchestration: prompt assembly, the tool-calling loop and
//! the events it reports along the way.

mod events;
mod history;
mod prompt;
mod runner;

pub use events::{AgentEvent, EventSink};
pub use history::History;
pub use prompt::system_prompt;
pub use runner::{AgentError, AgentOutcome, CompletionStatus, Orchestrator};
