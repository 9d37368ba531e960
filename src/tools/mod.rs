//! The four tools offered to the model and the executor that runs them.

mod call;
mod create_issue;
mod definitions;
mod executor;
mod issue;
mod prepare_search;
mod results;
mod sprint_issues;

pub use call::{ToolCall, ToolName};
pub use definitions::{tool_definitions, ToolDefinition};
pub use executor::ToolExecutor;
pub use results::ToolOutput;
