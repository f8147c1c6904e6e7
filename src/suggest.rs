//! Command-backed suggestion provider.
//!
//! Renders the suggestion prompt, hands it to an external LLM command and
//! reads candidate sub-tasks and materials back out of the reply.

use crate::config::SuggestionConfig;
use crate::error::{Error, ProviderError, Result};
use crate::templates::{self, SUGGEST_PROMPT};
use crate::traits::{CommandRunner, SuggestionProvider, Suggestions};
use once_cell::sync::Lazy;
use regex::Regex;
use tera::Context;

/// Longest slice of provider diagnostics kept in an error message.
const MAX_ERROR_CHARS: usize = 500;

/// A numbered (`1.`, `2)`, `3`) or bulleted (`-`, `*`, `•`) list item.
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\d+[.)]?|[-*•])\s+(.+?)\s*$").expect("list item regex is valid")
});

/// Section headers that switch the target list.
static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:#+\s*)?\**\s*(sub[- ]?tasks?|steps|materials?(?: needed)?|materials and tools|tools)\s*:?\s*\**\s*:?\s*$",
    )
    .expect("section header regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Subtasks,
    Materials,
}

fn section_header(line: &str) -> Option<Section> {
    let caps = SECTION_HEADER.captures(line)?;
    let name = caps[1].to_lowercase();
    if name.starts_with("material") || name == "tools" {
        Some(Section::Materials)
    } else {
        Some(Section::Subtasks)
    }
}

fn clean_item(raw: &str) -> String {
    raw.trim().trim_matches('*').trim().to_string()
}

/// Extract candidate sub-tasks and materials from a free-text reply.
///
/// Items under a `Materials:` header are materials; all other list items are
/// sub-tasks. A reply with no list items at all is read line by line as
/// sub-tasks, but only if it has at most `max_items` lines. Each list is
/// capped at `max_items`.
#[must_use]
pub fn parse_reply(reply: &str, max_items: usize) -> Suggestions {
    let mut suggestions = Suggestions::default();
    let mut current = Section::Subtasks;
    let mut saw_item = false;

    for line in reply.lines() {
        if let Some(section) = section_header(line) {
            current = section;
            continue;
        }
        let Some(caps) = LIST_ITEM.captures(line) else {
            continue;
        };
        saw_item = true;

        let item = clean_item(&caps[1]);
        if item.is_empty() {
            continue;
        }
        match current {
            Section::Subtasks => suggestions.subtasks.push(item),
            Section::Materials => suggestions.materials.push(item),
        }
    }

    if !saw_item {
        let lines: Vec<String> = reply
            .lines()
            .filter(|line| section_header(line).is_none())
            .map(clean_item)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() <= max_items {
            suggestions.subtasks = lines;
        }
    }

    suggestions.subtasks.truncate(max_items);
    suggestions.materials.truncate(max_items);
    suggestions
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Suggestion provider that shells out to an LLM command line tool.
pub struct CommandSuggestionProvider<'a> {
    runner: &'a dyn CommandRunner,
    config: SuggestionConfig,
}

impl<'a> CommandSuggestionProvider<'a> {
    /// Create a provider running commands through `runner` as `config` says.
    pub fn new(runner: &'a dyn CommandRunner, config: SuggestionConfig) -> Self {
        Self { runner, config }
    }

    fn render_prompt(&self, task_description: &str, existing: &[String]) -> Result<String> {
        let mut ctx = Context::new();
        ctx.insert("task_description", task_description);
        ctx.insert("existing_subtasks", existing);
        ctx.insert("max_items", &self.config.max_items);
        templates::render(SUGGEST_PROMPT, &ctx)
    }
}

impl SuggestionProvider for CommandSuggestionProvider<'_> {
    fn suggest(&self, task_description: &str, existing_subtasks: &[String]) -> Result<Suggestions> {
        let command = self.config.command.as_str();
        if !self.runner.is_available(command) {
            tracing::warn!(command, "suggestion command not found");
            return Err(ProviderError::Unavailable(format!("command '{command}' not found")).into());
        }

        let prompt = self.render_prompt(task_description, existing_subtasks)?;
        let mut args: Vec<&str> = self.config.args.iter().map(String::as_str).collect();
        args.push(&prompt);

        let output =
            self.runner.run(command, &args, Some(self.config.timeout())).map_err(|e| match e {
                Error::Io(io) => {
                    tracing::warn!(command, error = %io, "could not start suggestion command");
                    ProviderError::Unavailable(io.to_string()).into()
                }
                other => other,
            })?;

        if output.timed_out {
            tracing::warn!(command, timeout_secs = self.config.timeout_secs, "suggestions timed out");
            return Err(ProviderError::Timeout { timeout_secs: self.config.timeout_secs }.into());
        }
        if !output.success() {
            let message = truncate_chars(output.combined_output().trim(), MAX_ERROR_CHARS);
            tracing::warn!(command, exit_code = output.exit_code, "suggestion command failed");
            return Err(ProviderError::Failed { exit_code: output.exit_code, message }.into());
        }

        let suggestions = parse_reply(&output.stdout, self.config.max_items);
        tracing::debug!(
            subtasks = suggestions.subtasks.len(),
            materials = suggestions.materials.len(),
            "parsed suggestions"
        );
        Ok(suggestions)
    }
}
