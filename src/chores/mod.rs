//! Chore tracking.
//!
//! Chores own an ordered list of sub-tasks and a list of materials. The store
//! keeps each chore's `order_index` values unique and moves sub-tasks one slot
//! at a time. Suggested sub-tasks and materials are deduplicated against what
//! is already recorded before anything is written.
//!
//! # Example
//!
//! ```no_run
//! use chore_tracker::chores::{ChoreStore, Direction, SqliteChoreStore};
//!
//! let store = SqliteChoreStore::new("/tmp/chores.db").unwrap();
//!
//! let chore = store.create_task("Clean the kitchen", "", None, &[]).unwrap();
//! store.add_subtask(chore.id, "Wipe counters").unwrap();
//! let dishes = store.add_subtask(chore.id, "Wash dishes").unwrap().unwrap();
//!
//! // Dishes first
//! store.move_subtask(chore.id, dishes.id, Direction::Up).unwrap();
//! ```

pub mod assist;
pub mod merge;
pub mod models;
pub mod store;

pub use assist::suggest_for_task;
pub use merge::{merge_suggestions, MergeResult};
pub use models::{
    parse_due_date, Direction, InvalidDirection, InvalidStatus, Status, Subtask, Task,
};
pub use store::{ChoreStore, SqliteChoreStore, SubtaskUpdate, SuggestionOutcome, TaskUpdate};
