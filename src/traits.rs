//! Core traits for testability and abstraction.

use crate::error::Result;
use serde::Serialize;
use std::time::Duration;

/// Output from a command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// The exit code of the command, or -1 if it was killed.
    pub exit_code: i32,
    /// The stdout output.
    pub stdout: String,
    /// The stderr output.
    pub stderr: String,
    /// Whether the command was killed for running past its timeout.
    pub timed_out: bool,
}

impl CommandOutput {
    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Get combined stdout and stderr.
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Trait for running external commands.
///
/// This trait abstracts command execution for testability.
pub trait CommandRunner {
    /// Run a command with the given arguments and timeout.
    ///
    /// A command that outlives `timeout` is killed and reported with
    /// `timed_out` set rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or executed.
    fn run(&self, program: &str, args: &[&str], timeout: Option<Duration>)
        -> Result<CommandOutput>;

    /// Check if a program is available in PATH.
    fn is_available(&self, program: &str) -> bool;
}

/// Candidate items returned by a suggestion provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    /// Proposed sub-task descriptions, in the provider's order.
    pub subtasks: Vec<String>,
    /// Proposed materials, in the provider's order.
    pub materials: Vec<String>,
}

impl Suggestions {
    /// Whether the provider proposed nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subtasks.is_empty() && self.materials.is_empty()
    }
}

/// Source of suggested sub-tasks and materials for a chore.
///
/// Calls may be slow and may fail. They are always made outside any store
/// transaction.
pub trait SuggestionProvider {
    /// Propose sub-tasks and materials for a chore.
    ///
    /// # Errors
    ///
    /// Returns `Error::Provider` if the provider is unavailable, fails, or
    /// times out.
    fn suggest(&self, task_description: &str, existing_subtasks: &[String])
        -> Result<Suggestions>;
}
