//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::chores::models::format_due_date;
use crate::chores::{
    parse_due_date, suggest_for_task, ChoreStore, Direction, SqliteChoreStore, Status,
    SubtaskUpdate, SuggestionOutcome, Task, TaskUpdate,
};
use crate::cli::{Cli, Command, SubCommand};
use crate::command::RealCommandRunner;
use crate::config::{self, ChoresConfig};
use crate::paths;
use crate::suggest::CommandSuggestionProvider;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Run a parsed CLI invocation.
pub fn run(cli: Cli) -> CliOutput {
    if !cli.command.needs_store() {
        return match cli.command {
            Command::EnsureConfig => run_ensure_config(),
            _ => run_version(),
        };
    }

    let config = match ChoresConfig::load() {
        Ok(c) => c,
        Err(e) => return error_output(format!("Error loading config: {e}")),
    };
    let store = match open_store(cli.db.as_deref(), &config) {
        Ok(s) => s,
        Err(e) => return error_output(e),
    };
    run_store_cmd(&store, &config, cli.command)
}

fn run_store_cmd(store: &SqliteChoreStore, config: &ChoresConfig, command: Command) -> CliOutput {
    match command {
        Command::Add { description, notes, due, materials } => {
            chore_add(store, &description, &notes, due.as_deref(), &materials)
        }
        Command::List => chore_list(store),
        Command::Show { id } => chore_show(store, id),
        Command::Status { id, status } => chore_status(store, id, &status),
        Command::Edit { id, description, notes, due, materials, clear_materials } => {
            let materials = if clear_materials {
                Some(Vec::new())
            } else if materials.is_empty() {
                None
            } else {
                Some(materials)
            };
            chore_edit(store, id, description, notes, due.as_deref(), materials)
        }
        Command::Delete { id } => chore_delete(store, id),
        Command::Sub(cmd) => run_sub_cmd(store, cmd),
        Command::Suggest { id } => chore_suggest(store, config, id),
        Command::EnsureConfig => run_ensure_config(),
        Command::Version => run_version(),
    }
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    CliOutput {
        exit_code: ExitCode::SUCCESS,
        stdout: vec![],
        stderr: vec![format!("chores v{}", crate::VERSION)],
    }
}

fn run_ensure_config() -> CliOutput {
    let Some(dir) = paths::data_dir() else {
        return error_output("Cannot determine data directory; set CHORES_HOME".to_string());
    };
    match config::ensure_config(&dir) {
        Ok((config, created)) => {
            let path = ChoresConfig::config_path(&dir);
            let mut messages = vec![if created {
                format!("Wrote default config to {}", path.display())
            } else {
                format!("Config already present at {}", path.display())
            }];
            messages.push(format!("  database: {}", config.database_path_in(&dir).display()));
            messages.push(format!("  suggestions command: {}", config.suggestions.command));
            CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![], stderr: messages }
        }
        Err(e) => error_output(format!("Error ensuring config: {e}")),
    }
}

// === Chore Commands ===

fn chore_add(
    store: &SqliteChoreStore,
    description: &str,
    notes: &str,
    due: Option<&str>,
    materials: &[String],
) -> CliOutput {
    if let Err(e) = require_text(description) {
        return error_output(e);
    }
    let due_date = match due.map(parse_due_date).transpose() {
        Ok(d) => d.flatten(),
        Err(e) => return error_output(e.to_string()),
    };

    match store.create_task(description.trim(), notes, due_date, materials) {
        Ok(task) => json_output(&task),
        Err(e) => error_output(e.to_string()),
    }
}

fn chore_list(store: &SqliteChoreStore) -> CliOutput {
    match store.list_tasks() {
        Ok(tasks) => {
            let outputs: Vec<ChoreSummary> = tasks.iter().map(ChoreSummary::from).collect();
            json_output(&outputs)
        }
        Err(e) => error_output(e.to_string()),
    }
}

fn chore_show(store: &SqliteChoreStore, id: i64) -> CliOutput {
    match store.get_task(id) {
        Ok(Some(task)) => json_output(&task),
        Ok(None) => not_found("Chore", id),
        Err(e) => error_output(e.to_string()),
    }
}

fn chore_status(store: &SqliteChoreStore, id: i64, status: &str) -> CliOutput {
    let status = match Status::from_str(status) {
        Ok(s) => s,
        Err(e) => return error_output(e.to_string()),
    };

    match store.update_task_status(id, status) {
        Ok(Some(task)) => json_output(&task),
        Ok(None) => not_found("Chore", id),
        Err(e) => error_output(e.to_string()),
    }
}

fn chore_edit(
    store: &SqliteChoreStore,
    id: i64,
    description: Option<String>,
    notes: Option<String>,
    due: Option<&str>,
    materials: Option<Vec<String>>,
) -> CliOutput {
    if let Some(Err(e)) = description.as_deref().map(require_text) {
        return error_output(e);
    }
    let due_date = match due.map(parse_due_date).transpose() {
        Ok(d) => d,
        Err(e) => return error_output(e.to_string()),
    };

    let update = TaskUpdate {
        description: description.map(|d| d.trim().to_string()),
        notes,
        due_date,
        materials,
    };

    match store.update_task_details(id, update) {
        Ok(Some(task)) => json_output(&task),
        Ok(None) => not_found("Chore", id),
        Err(e) => error_output(e.to_string()),
    }
}

fn chore_delete(store: &SqliteChoreStore, id: i64) -> CliOutput {
    match store.delete_task(id) {
        Ok(true) => success_output(format!("Chore deleted: {id}")),
        Ok(false) => not_found("Chore", id),
        Err(e) => error_output(e.to_string()),
    }
}

fn chore_suggest(store: &SqliteChoreStore, config: &ChoresConfig, id: i64) -> CliOutput {
    let runner = RealCommandRunner::new();
    let provider = CommandSuggestionProvider::new(&runner, config.suggestions.clone());

    match suggest_for_task(store, &provider, id) {
        Ok(Some(outcome)) => json_output(&SuggestOutput { task_id: id, outcome: &outcome }),
        Ok(None) => not_found("Chore", id),
        Err(e) => error_output(format!("Could not get suggestions: {e}")),
    }
}

// === Sub-task Commands ===

fn run_sub_cmd(store: &SqliteChoreStore, cmd: SubCommand) -> CliOutput {
    match cmd {
        SubCommand::Add { task_id, description } => sub_add(store, task_id, &description),
        SubCommand::Toggle { id } => sub_toggle(store, id),
        SubCommand::Edit { id, description, completed } => {
            sub_edit(store, id, description, completed)
        }
        SubCommand::Delete { id } => sub_delete(store, id),
        SubCommand::Move { task_id, id, direction } => sub_move(store, task_id, id, &direction),
    }
}

fn sub_add(store: &SqliteChoreStore, task_id: i64, description: &str) -> CliOutput {
    if let Err(e) = require_text(description) {
        return error_output(e);
    }

    match store.add_subtask(task_id, description.trim()) {
        Ok(Some(subtask)) => json_output(&subtask),
        Ok(None) => not_found("Chore", task_id),
        Err(e) => error_output(e.to_string()),
    }
}

fn sub_toggle(store: &SqliteChoreStore, id: i64) -> CliOutput {
    let current = match store.get_subtask(id) {
        Ok(Some(subtask)) => subtask,
        Ok(None) => return not_found("Sub-task", id),
        Err(e) => return error_output(e.to_string()),
    };

    let update = SubtaskUpdate { completed: Some(!current.completed), ..Default::default() };
    match store.update_subtask(id, update) {
        Ok(Some(subtask)) => json_output(&subtask),
        Ok(None) => not_found("Sub-task", id),
        Err(e) => error_output(e.to_string()),
    }
}

fn sub_edit(
    store: &SqliteChoreStore,
    id: i64,
    description: Option<String>,
    completed: Option<bool>,
) -> CliOutput {
    if let Some(Err(e)) = description.as_deref().map(require_text) {
        return error_output(e);
    }

    let update = SubtaskUpdate { description: description.map(|d| d.trim().to_string()), completed };
    match store.update_subtask(id, update) {
        Ok(Some(subtask)) => json_output(&subtask),
        Ok(None) => not_found("Sub-task", id),
        Err(e) => error_output(e.to_string()),
    }
}

fn sub_delete(store: &SqliteChoreStore, id: i64) -> CliOutput {
    match store.delete_subtask(id) {
        Ok(true) => success_output(format!("Sub-task deleted: {id}")),
        Ok(false) => not_found("Sub-task", id),
        Err(e) => error_output(e.to_string()),
    }
}

fn sub_move(store: &SqliteChoreStore, task_id: i64, id: i64, direction: &str) -> CliOutput {
    let direction = match Direction::from_str(direction) {
        Ok(d) => d,
        Err(e) => return error_output(e.to_string()),
    };

    match store.move_subtask(task_id, id, direction) {
        Ok(true) => match store.get_subtasks_for_task(task_id) {
            Ok(subtasks) => json_output(&subtasks),
            Err(e) => error_output(e.to_string()),
        },
        Ok(false) => error_output(format!(
            "Cannot move sub-task {id} {direction}: not a sub-task of chore {task_id}, or already at the limit"
        )),
        Err(e) => error_output(e.to_string()),
    }
}

// === Helpers ===

fn open_store(db: Option<&Path>, config: &ChoresConfig) -> Result<SqliteChoreStore, String> {
    let db_path = match db {
        Some(path) => path.to_path_buf(),
        None => {
            let dir = paths::data_dir()
                .ok_or_else(|| "Cannot determine data directory; set CHORES_HOME".to_string())?;
            config.database_path_in(&dir)
        }
    };
    SqliteChoreStore::new(&db_path).map_err(|e| e.to_string())
}

fn require_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        Err("Description cannot be empty".to_string())
    } else {
        Ok(())
    }
}

fn json_output<T: Serialize + ?Sized>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}

fn not_found(kind: &str, id: i64) -> CliOutput {
    error_output(format!("{kind} not found: {id}"))
}

// === Output Types ===

/// Chore summary for list output.
#[derive(Debug, Serialize)]
struct ChoreSummary {
    id: i64,
    description: String,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    subtasks_done: usize,
    subtasks_total: usize,
    materials: usize,
}

impl From<&Task> for ChoreSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            description: task.description.clone(),
            status: task.status,
            due_date: task.due_date.map(format_due_date),
            subtasks_done: task.completed_subtasks(),
            subtasks_total: task.sub_tasks.len(),
            materials: task.materials_needed.len(),
        }
    }
}

/// Result of a suggestion request.
#[derive(Debug, Serialize)]
struct SuggestOutput<'a> {
    task_id: i64,
    #[serde(flatten)]
    outcome: &'a SuggestionOutcome,
}
