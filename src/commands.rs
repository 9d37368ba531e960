/// REPL slash commands and autocomplete logic

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
  Help,
  Refresh,
  Cache,
  Reset,
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub kind: CommandKind,
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    kind: CommandKind::Help,
    name: "help",
    aliases: &["h", "?"],
    description: "List commands",
  },
  Command {
    kind: CommandKind::Refresh,
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Re-fetch sprints, statuses and team from Jira",
  },
  Command {
    kind: CommandKind::Cache,
    name: "cache",
    aliases: &["c", "info"],
    description: "Show the age of the cached board facts",
  },
  Command {
    kind: CommandKind::Reset,
    name: "reset",
    aliases: &["clear", "new"],
    description: "Forget the conversation so far",
  },
  Command {
    kind: CommandKind::Quit,
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit pmbot",
  },
];

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
  Empty,
  Command(CommandKind),
  /// Slash command that matched nothing, or matched several commands
  UnknownCommand(String),
  Question(String),
}

pub fn parse_input(line: &str) -> Input {
  let line = line.trim();
  if line.is_empty() {
    return Input::Empty;
  }
  let Some(name) = line.strip_prefix('/') else {
    return Input::Question(line.to_string());
  };
  let name = name.split_whitespace().next().unwrap_or("");
  match resolve_command(name) {
    Some(cmd) => Input::Command(cmd.kind),
    None => Input::UnknownCommand(name.to_string()),
  }
}

/// The command `input` unambiguously names: an exact name or alias, or a
/// prefix of exactly one command.
pub fn resolve_command(input: &str) -> Option<&'static Command> {
  let ranked = rank(input);
  match ranked.as_slice() {
    [(cmd, priority), ..] if *priority <= 1 => Some(*cmd),
    [(cmd, priority)] if *priority <= 3 => Some(*cmd),
    _ => None,
  }
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }
  rank(input).into_iter().map(|(cmd, _)| cmd).collect()
}

fn rank(input: &str) -> Vec<(&'static Command, u32)> {
  let input_lower = input.to_lowercase();
  if input_lower.is_empty() {
    return Vec::new();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);
  matches
}
