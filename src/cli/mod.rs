//! Command-line interface for the chore tracker.
//!
//! Chore commands sit at the top level; sub-task commands are grouped under
//! `chores sub`.

mod run;
mod sub;

#[cfg(test)]
mod tests;

pub use run::{run, CliOutput};
pub use sub::SubCommand;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Household chore tracker with ordered sub-tasks and materials lists.
///
/// Output is JSON on stdout. Errors go to stderr with exit code 1.
#[derive(Parser, Debug)]
#[command(name = "chores")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file to use instead of the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add a new chore.
    ///
    /// New chores start as pending with no sub-tasks.
    Add {
        /// What needs doing
        description: String,

        /// Planning notes
        #[arg(short, long, default_value = "")]
        notes: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// A material or tool needed (repeatable)
        #[arg(short, long = "material")]
        materials: Vec<String>,
    },

    /// List all chores with sub-task progress.
    List,

    /// Show a chore with its sub-tasks and materials.
    Show {
        /// Chore ID
        id: i64,
    },

    /// Set a chore's status: pending, in_progress or completed.
    Status {
        /// Chore ID
        id: i64,

        /// New status
        status: String,
    },

    /// Edit a chore's details.
    ///
    /// Only the options given are changed. `--due ""` removes the due date.
    Edit {
        /// Chore ID
        id: i64,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New notes
        #[arg(short, long)]
        notes: Option<String>,

        /// New due date (YYYY-MM-DD), or empty to clear
        #[arg(long)]
        due: Option<String>,

        /// Replace the materials list (repeatable)
        #[arg(short, long = "material", conflicts_with = "clear_materials")]
        materials: Vec<String>,

        /// Remove all materials
        #[arg(long)]
        clear_materials: bool,
    },

    /// Delete a chore and all of its sub-tasks.
    Delete {
        /// Chore ID
        id: i64,
    },

    /// Sub-task management.
    #[command(subcommand)]
    Sub(SubCommand),

    /// Ask the configured LLM command for sub-tasks and materials.
    ///
    /// Suggestions already on the chore (ignoring case and surrounding
    /// spaces) are skipped.
    Suggest {
        /// Chore ID
        id: i64,
    },

    /// Write a default config file if none exists.
    #[command(name = "ensure-config")]
    EnsureConfig,

    /// Show version information.
    Version,
}

impl Command {
    /// Returns true if this command reads or writes the chore database.
    #[must_use]
    pub const fn needs_store(&self) -> bool {
        !matches!(self, Self::EnsureConfig | Self::Version)
    }
}
