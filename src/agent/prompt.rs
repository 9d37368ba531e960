use std::fmt::Write;

use crate::cache::CachedFacts;

const TOOLS: &str = "\
## TOOLS
- prepare_search(names?, sprint_ids?): resolve people to emails and confirm the sprints in scope. \
Omit names for the whole team.
- get_sprint_issues(sprint_ids, assignees?, status_filters?, keyword?, include_breakdown?): list \
sprint issues. status_filters take 'done', 'in_progress', 'todo' or an exact status from AVAILABLE \
STATUSES. Set include_breakdown only for workload or productivity questions.
- get_issue(issue_key): full details of one issue, comments included.
- create_issue(summary, description?, issue_type?, assignee?, sprint_id?, story_points?, status?): \
create an issue. Only call it after the user has confirmed the details.
";

const WORKFLOW: &str = "\
## WORKFLOW
1. Pick the sprint id from AVAILABLE SPRINTS. No tool call is needed for this.
2. Call prepare_search to resolve any people mentioned.
3. Call get_sprint_issues for the data, or create_issue once the user confirms.
";

const RULES: &str = "\
## RULES
1. Only use sprint ids from AVAILABLE SPRINTS.
2. Extract sprint, people and status from the current question.
3. If a name matches several people, ask which one is meant.
4. If no issues come back, say \"No tasks found\".
5. Be brief. Issue lists and breakdowns are shown to the user separately, so do not repeat them.
6. Every number you state must match the tool output exactly. Never invent data.
7. For follow-ups such as \"how many points?\", reuse the previous tool result in the conversation.
";

const SUMMARIES: &str = "\
## SUMMARIZING SPRINTS
When asked to summarize or recap a sprint, group the issue summaries by theme (feature area, bug \
fixes, tracking, and so on), describe what was done in each group with its task count, and close \
with the key highlights.
";

/// System prompt carrying the board facts the model needs to pick ids.
pub fn system_prompt(facts: &CachedFacts, project_key: Option<&str>) -> String {
  let mut prompt = String::from(
    "You are a Jira project management assistant. Answer questions about sprints and issues using the tools.\n",
  );
  if let Some(key) = project_key {
    let _ = writeln!(prompt, "New issues are created in project {}.", key);
  }

  prompt.push_str("\n## AVAILABLE SPRINTS (use these ids directly)\n");
  for sprint in &facts.sprints {
    let _ = writeln!(prompt, "- {} (ID: {}, {})", sprint.name, sprint.id, sprint.state);
  }

  prompt.push_str("\n## AVAILABLE STATUSES\n");
  let statuses: Vec<&str> = facts.statuses.iter().map(String::as_str).collect();
  let _ = writeln!(prompt, "{}", statuses.join(", "));

  prompt.push_str("\n## TEAM MEMBERS (use prepare_search to get their emails)\n");
  for member in &facts.team_members {
    let _ = writeln!(prompt, "- {}", member.name);
  }

  for section in [TOOLS, WORKFLOW, RULES, SUMMARIES] {
    prompt.push('\n');
    prompt.push_str(section);
  }
  prompt
}
