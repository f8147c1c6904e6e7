//! Testing utilities and mock implementations.
//!
//! These doubles are public so integration tests and downstream crates can
//! drive the suggestion flow without a real provider.

#![allow(clippy::needless_pass_by_ref_mut)] // &mut self for ergonomics with RefCell

use crate::error::{Error, ProviderError, Result};
use crate::traits::{CommandOutput, CommandRunner, SuggestionProvider, Suggestions};
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// A recorded call to [`MockCommandRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program that was run.
    pub program: String,
    /// Arguments it was given.
    pub args: Vec<String>,
    /// Timeout it was given.
    pub timeout: Option<Duration>,
}

/// A mock command runner for testing.
///
/// Replies with queued outputs in order and records every call, so tests can
/// inspect the generated prompt afterwards.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    outputs: RefCell<Vec<CommandOutput>>,
    calls: RefCell<Vec<RecordedCall>>,
    available_programs: RefCell<Vec<String>>,
}

impl MockCommandRunner {
    /// Create a new mock command runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the output of the next call.
    pub fn respond(&mut self, output: CommandOutput) {
        self.outputs.borrow_mut().push(output);
    }

    /// Queue a successful reply with the given stdout.
    pub fn respond_with_stdout(&mut self, stdout: &str) {
        self.respond(CommandOutput { stdout: stdout.to_string(), ..Default::default() });
    }

    /// Add a program as available.
    pub fn set_available(&mut self, program: &str) {
        self.available_programs.borrow_mut().push(program.to_string());
    }

    /// All calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Verify all queued outputs were consumed.
    ///
    /// # Panics
    ///
    /// Panics if some queued outputs were never returned.
    pub fn verify(&self) {
        let made = self.calls.borrow().len();
        let remaining = self.outputs.borrow().len();
        assert_eq!(remaining, 0, "{remaining} queued outputs unused after {made} calls");
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_string(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
            timeout,
        });

        let mut outputs = self.outputs.borrow_mut();
        assert!(!outputs.is_empty(), "Unexpected command call: {program} {args:?}");
        Ok(outputs.remove(0))
    }

    fn is_available(&self, program: &str) -> bool {
        self.available_programs.borrow().iter().any(|p| p == program)
    }
}

/// A suggestion provider that returns a fixed reply.
#[derive(Debug)]
pub struct StubSuggestionProvider {
    reply: std::result::Result<Suggestions, ProviderError>,
    calls: Cell<usize>,
}

impl StubSuggestionProvider {
    /// A provider that always proposes the given items.
    pub fn new<S: AsRef<str>, M: AsRef<str>>(subtasks: &[S], materials: &[M]) -> Self {
        Self {
            reply: Ok(Suggestions {
                subtasks: subtasks.iter().map(|s| s.as_ref().to_string()).collect(),
                materials: materials.iter().map(|m| m.as_ref().to_string()).collect(),
            }),
            calls: Cell::new(0),
        }
    }

    /// A provider that always fails with `error`.
    #[must_use]
    pub const fn failing(error: ProviderError) -> Self {
        Self { reply: Err(error), calls: Cell::new(0) }
    }

    /// Number of times `suggest` was called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SuggestionProvider for StubSuggestionProvider {
    fn suggest(&self, _task_description: &str, _existing: &[String]) -> Result<Suggestions> {
        self.calls.set(self.calls.get() + 1);
        self.reply.clone().map_err(Error::Provider)
    }
}

/// A command runner that fails to start anything.
#[derive(Debug)]
pub struct FailingCommandRunner {
    error_message: String,
}

impl FailingCommandRunner {
    /// Create a runner whose every call fails with `error_message`.
    pub fn new(error_message: impl Into<String>) -> Self {
        Self { error_message: error_message.into() }
    }
}

impl CommandRunner for FailingCommandRunner {
    fn run(
        &self,
        _program: &str,
        _args: &[&str],
        _timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        Err(std::io::Error::other(self.error_message.clone()).into())
    }

    fn is_available(&self, _program: &str) -> bool {
        false
    }
}
