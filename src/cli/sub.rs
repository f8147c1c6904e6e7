//! Sub-task CLI subcommands.

use clap::Subcommand;

/// Sub-task management commands.
///
/// Sub-tasks are ordered steps of a chore. New ones go to the end of the
/// list; `move` shifts one a single slot up or down.
///
/// ```bash
/// chores sub add 1 "Wash dishes"
/// chores sub move 1 4 up
/// chores sub toggle 4
/// ```
#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// Append a sub-task to a chore.
    Add {
        /// Chore ID
        task_id: i64,

        /// What this step involves
        description: String,
    },

    /// Flip a sub-task between done and not done.
    Toggle {
        /// Sub-task ID
        id: i64,
    },

    /// Edit a sub-task.
    Edit {
        /// Sub-task ID
        id: i64,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// Set completion explicitly
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Delete a sub-task. Other sub-tasks keep their positions.
    Delete {
        /// Sub-task ID
        id: i64,
    },

    /// Move a sub-task one slot up or down.
    Move {
        /// Chore ID
        task_id: i64,

        /// Sub-task ID
        id: i64,

        /// Direction: up or down
        direction: String,
    },
}
