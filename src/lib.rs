//! # `chore_tracker`
//!
//! Household chores with ordered sub-tasks, materials lists and optional
//! LLM-assisted suggestions, stored in `SQLite`.

pub mod chores;
#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod suggest;
pub mod templates;
pub mod testing;
pub mod traits;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
