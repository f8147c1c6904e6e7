//! Chore store trait and `SQLite` implementation.
//!
//! Every operation opens its own connection and closes it on return. Writes
//! that touch more than one row run in a single immediate transaction, so a
//! failure part-way through leaves the database as it was.

use crate::chores::merge::{merge_suggestions, MergeResult};
use crate::chores::models::{
    format_due_date, join_materials, parse_materials, Direction, Status, Subtask, Task,
    DUE_DATE_FORMAT,
};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const TASK_COLUMNS: &str = "id, description, status, notes, due_date, materials_needed";
const SUBTASK_COLUMNS: &str = "id, task_id, description, completed, order_index";

/// Trait for chore storage operations.
///
/// Lookups by ID return `Ok(None)` (or `Ok(false)`) when the row does not
/// exist; `Err` is reserved for invalid input and storage failures.
#[allow(clippy::missing_errors_doc)]
pub trait ChoreStore {
    // Chores
    /// Create a chore. It starts `pending` with no sub-tasks.
    fn create_task(
        &self,
        description: &str,
        notes: &str,
        due_date: Option<NaiveDate>,
        materials: &[String],
    ) -> Result<Task>;

    /// Get a chore with its sub-tasks in order.
    fn get_task(&self, id: i64) -> Result<Option<Task>>;

    /// List all chores by ID, each with its sub-tasks in order.
    fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Set a chore's status.
    fn update_task_status(&self, id: i64, status: Status) -> Result<Option<Task>>;

    /// Update the chore fields set in `update`, leaving the rest untouched.
    fn update_task_details(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>>;

    /// Delete a chore and all of its sub-tasks.
    fn delete_task(&self, id: i64) -> Result<bool>;

    // Sub-tasks
    /// Append a sub-task to a chore. Returns `None` if the chore does not exist.
    fn add_subtask(&self, task_id: i64, description: &str) -> Result<Option<Subtask>>;

    /// Get a sub-task by ID.
    fn get_subtask(&self, id: i64) -> Result<Option<Subtask>>;

    /// Get a chore's sub-tasks ordered by `order_index`.
    fn get_subtasks_for_task(&self, task_id: i64) -> Result<Vec<Subtask>>;

    /// Update the sub-task fields set in `update`.
    fn update_subtask(&self, id: i64, update: SubtaskUpdate) -> Result<Option<Subtask>>;

    /// Delete a sub-task. Siblings keep their indices.
    fn delete_subtask(&self, id: i64) -> Result<bool>;

    /// Swap a sub-task with its neighbour in `direction`.
    ///
    /// Returns `false` without changing anything if the sub-task is not one of
    /// the chore's sub-tasks or is already first (up) or last (down).
    fn move_subtask(&self, task_id: i64, subtask_id: i64, direction: Direction) -> Result<bool>;

    // Suggestions
    /// Merge suggested sub-tasks and materials into a chore and persist the
    /// accepted ones, all in one transaction.
    fn apply_suggestions(
        &self,
        task_id: i64,
        subtask_candidates: &[String],
        material_candidates: &[String],
    ) -> Result<Option<SuggestionOutcome>>;
}

/// Fields that can be updated on a chore.
///
/// `None` leaves a field unchanged. For `due_date`, `Some(None)` clears the
/// date. For `materials`, `Some(vec![])` clears the list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// New description (if Some).
    pub description: Option<String>,
    /// New notes (if Some).
    pub notes: Option<String>,
    /// New due date (if Some); `Some(None)` removes it.
    pub due_date: Option<Option<NaiveDate>>,
    /// Replacement materials list (if Some).
    pub materials: Option<Vec<String>>,
}

impl TaskUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.notes.is_none()
            && self.due_date.is_none()
            && self.materials.is_none()
    }
}

/// Fields that can be updated on a sub-task.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubtaskUpdate {
    /// New description (if Some).
    pub description: Option<String>,
    /// New completion flag (if Some).
    pub completed: Option<bool>,
}

impl SubtaskUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none()
    }
}

/// What a suggestion merge added to a chore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionOutcome {
    /// Merge of the suggested sub-tasks.
    pub subtasks: MergeResult,
    /// Merge of the suggested materials.
    pub materials: MergeResult,
}

impl SuggestionOutcome {
    /// Total number of items added.
    #[must_use]
    pub const fn added(&self) -> usize {
        self.subtasks.added + self.materials.added
    }

    /// Total number of candidates skipped.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.subtasks.skipped + self.materials.skipped
    }
}

/// SQLite-based chore store.
#[derive(Debug, Clone)]
pub struct SqliteChoreStore {
    db_path: PathBuf,
}

impl SqliteChoreStore {
    /// Create a new `SQLite` chore store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'in_progress', 'completed')),
                notes TEXT NOT NULL DEFAULT '',
                due_date TEXT,
                materials_needed TEXT
            );

            CREATE TABLE IF NOT EXISTS sub_tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                description TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                order_index INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_sub_tasks_task_order ON sub_tasks(task_id, order_index);
            ",
        )?;

        // Databases created before materials were tracked lack the column.
        if !column_exists(&conn, "tasks", "materials_needed")? {
            conn.execute("ALTER TABLE tasks ADD COLUMN materials_needed TEXT", [])?;
            tracing::info!(db = %self.db_path.display(), "added materials_needed column");
        }

        Ok(())
    }

    /// Parse a chore from a row, without its sub-tasks.
    fn parse_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get(2)?;
        let notes: Option<String> = row.get(3)?;
        let due_date: Option<String> = row.get(4)?;
        let materials: Option<String> = row.get(5)?;

        Ok(Task {
            id: row.get(0)?,
            description: row.get(1)?,
            status: Status::from_str(&status_str).unwrap_or_default(),
            notes: notes.unwrap_or_default(),
            due_date: due_date
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), DUE_DATE_FORMAT).ok()),
            materials_needed: materials.as_deref().map(parse_materials).unwrap_or_default(),
            sub_tasks: Vec::new(),
        })
    }

    /// Parse a sub-task from a row.
    fn parse_subtask(row: &rusqlite::Row) -> rusqlite::Result<Subtask> {
        Ok(Subtask {
            id: row.get(0)?,
            task_id: row.get(1)?,
            description: row.get(2)?,
            completed: row.get::<_, i64>(3)? != 0,
            order_index: row.get(4)?,
        })
    }

    fn task_exists(conn: &Connection, id: i64) -> Result<bool> {
        let exists =
            conn.query_row("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)", params![id], |row| {
                row.get(0)
            })?;
        Ok(exists)
    }

    fn query_subtasks(conn: &Connection, task_id: i64) -> Result<Vec<Subtask>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBTASK_COLUMNS} FROM sub_tasks WHERE task_id = ?1 ORDER BY order_index ASC, id ASC"
        ))?;
        let subtasks =
            stmt.query_map(params![task_id], Self::parse_subtask)?.collect::<rusqlite::Result<_>>()?;
        Ok(subtasks)
    }

    fn query_subtask(conn: &Connection, id: i64) -> Result<Option<Subtask>> {
        let subtask = conn
            .query_row(
                &format!("SELECT {SUBTASK_COLUMNS} FROM sub_tasks WHERE id = ?1"),
                params![id],
                Self::parse_subtask,
            )
            .optional()?;
        Ok(subtask)
    }

    /// Load a chore and its ordered sub-tasks through `conn`.
    fn query_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                Self::parse_task,
            )
            .optional()?;

        match task {
            Some(mut task) => {
                task.sub_tasks = Self::query_subtasks(conn, id)?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Index for the next appended sub-task: one past the current maximum.
    fn next_order_index(conn: &Connection, task_id: i64) -> Result<i64> {
        let next = conn.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM sub_tasks WHERE task_id = ?1",
            params![task_id],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn insert_subtask(
        conn: &Connection,
        task_id: i64,
        description: &str,
        order_index: i64,
    ) -> Result<i64> {
        conn.execute(
            "INSERT INTO sub_tasks (task_id, description, completed, order_index)
             VALUES (?1, ?2, 0, ?3)",
            params![task_id, description, order_index],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

/// Reject blank descriptions.
fn require_description<'a>(description: &'a str, what: &str) -> Result<&'a str> {
    if description.trim().is_empty() {
        return Err(Error::validation(format!("{what} description cannot be empty")));
    }
    Ok(description)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

impl ChoreStore for SqliteChoreStore {
    fn create_task(
        &self,
        description: &str,
        notes: &str,
        due_date: Option<NaiveDate>,
        materials: &[String],
    ) -> Result<Task> {
        require_description(description, "chore")?;
        let conn = self.open()?;

        conn.execute(
            "INSERT INTO tasks (description, status, notes, due_date, materials_needed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                description,
                Status::Pending.as_str(),
                notes,
                due_date.map(format_due_date),
                join_materials(materials),
            ],
        )?;
        let id = conn.last_insert_rowid();

        let task = Self::query_task(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tracing::info!(task_id = id, "created chore");
        Ok(task)
    }

    fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.open()?;
        tracing::debug!(task_id = id, "fetching chore");
        Self::query_task(&conn, id)
    }

    fn list_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.open()?;

        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"))?;
        let mut tasks: Vec<Task> =
            stmt.query_map([], Self::parse_task)?.collect::<rusqlite::Result<_>>()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBTASK_COLUMNS} FROM sub_tasks ORDER BY task_id ASC, order_index ASC, id ASC"
        ))?;
        let mut by_task: HashMap<i64, Vec<Subtask>> = HashMap::new();
        for subtask in stmt.query_map([], Self::parse_subtask)? {
            let subtask = subtask?;
            by_task.entry(subtask.task_id).or_default().push(subtask);
        }

        for task in &mut tasks {
            task.sub_tasks = by_task.remove(&task.id).unwrap_or_default();
        }

        tracing::debug!(count = tasks.len(), "listed chores");
        Ok(tasks)
    }

    fn update_task_status(&self, id: i64, status: Status) -> Result<Option<Task>> {
        let conn = self.open()?;

        let rows = conn
            .execute("UPDATE tasks SET status = ?1 WHERE id = ?2", params![status.as_str(), id])?;
        if rows == 0 {
            return Ok(None);
        }

        tracing::info!(task_id = id, status = %status, "updated chore status");
        Self::query_task(&conn, id)
    }

    fn update_task_details(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>> {
        if update.is_empty() {
            return self.get_task(id);
        }
        if let Some(ref description) = update.description {
            require_description(description, "chore")?;
        }

        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !Self::task_exists(&tx, id)? {
            return Ok(None);
        }

        // Build dynamic UPDATE statement
        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(description) = update.description {
            updates.push("description = ?");
            values.push(Box::new(description));
        }
        if let Some(notes) = update.notes {
            updates.push("notes = ?");
            values.push(Box::new(notes));
        }
        if let Some(due_date) = update.due_date {
            updates.push("due_date = ?");
            values.push(Box::new(due_date.map(format_due_date)));
        }
        if let Some(materials) = update.materials {
            updates.push("materials_needed = ?");
            values.push(Box::new(join_materials(&materials)));
        }

        values.push(Box::new(id));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", updates.join(", "));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(AsRef::as_ref).collect();
        tx.execute(&sql, params.as_slice())?;

        let task = Self::query_task(&tx, id)?;
        tx.commit()?;

        tracing::info!(task_id = id, fields = %updates.join(", "), "updated chore details");
        Ok(task)
    }

    fn delete_task(&self, id: i64) -> Result<bool> {
        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Explicit so the cascade also holds on databases without the foreign key.
        let subtasks = tx.execute("DELETE FROM sub_tasks WHERE task_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        tx.commit()?;

        if rows > 0 {
            tracing::info!(task_id = id, subtasks, "deleted chore");
        }
        Ok(rows > 0)
    }

    fn add_subtask(&self, task_id: i64, description: &str) -> Result<Option<Subtask>> {
        require_description(description, "sub-task")?;

        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !Self::task_exists(&tx, task_id)? {
            return Ok(None);
        }

        let order_index = Self::next_order_index(&tx, task_id)?;
        let id = Self::insert_subtask(&tx, task_id, description, order_index)?;
        let subtask = Self::query_subtask(&tx, id)?;
        tx.commit()?;

        tracing::info!(task_id, subtask_id = id, order_index, "added sub-task");
        Ok(subtask)
    }

    fn get_subtask(&self, id: i64) -> Result<Option<Subtask>> {
        let conn = self.open()?;
        Self::query_subtask(&conn, id)
    }

    fn get_subtasks_for_task(&self, task_id: i64) -> Result<Vec<Subtask>> {
        let conn = self.open()?;
        Self::query_subtasks(&conn, task_id)
    }

    fn update_subtask(&self, id: i64, update: SubtaskUpdate) -> Result<Option<Subtask>> {
        if update.is_empty() {
            return self.get_subtask(id);
        }
        if let Some(ref description) = update.description {
            require_description(description, "sub-task")?;
        }

        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if Self::query_subtask(&tx, id)?.is_none() {
            return Ok(None);
        }

        if let Some(ref description) = update.description {
            tx.execute(
                "UPDATE sub_tasks SET description = ?1 WHERE id = ?2",
                params![description, id],
            )?;
        }
        if let Some(completed) = update.completed {
            tx.execute(
                "UPDATE sub_tasks SET completed = ?1 WHERE id = ?2",
                params![i64::from(completed), id],
            )?;
        }

        let subtask = Self::query_subtask(&tx, id)?;
        tx.commit()?;

        tracing::info!(subtask_id = id, "updated sub-task");
        Ok(subtask)
    }

    fn delete_subtask(&self, id: i64) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM sub_tasks WHERE id = ?1", params![id])?;
        if rows > 0 {
            tracing::info!(subtask_id = id, "deleted sub-task");
        }
        Ok(rows > 0)
    }

    fn move_subtask(&self, task_id: i64, subtask_id: i64, direction: Direction) -> Result<bool> {
        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let siblings = Self::query_subtasks(&tx, task_id)?;
        let Some(position) = siblings.iter().position(|st| st.id == subtask_id) else {
            tracing::debug!(task_id, subtask_id, "sub-task not found under chore");
            return Ok(false);
        };

        let neighbour = match direction {
            Direction::Up => position.checked_sub(1),
            Direction::Down => Some(position + 1).filter(|&n| n < siblings.len()),
        };
        let Some(neighbour) = neighbour else {
            tracing::debug!(task_id, subtask_id, %direction, "sub-task already at the limit");
            return Ok(false);
        };

        let current = &siblings[position];
        let other = &siblings[neighbour];
        tx.execute(
            "UPDATE sub_tasks SET order_index = ?1 WHERE id = ?2",
            params![other.order_index, current.id],
        )?;
        tx.execute(
            "UPDATE sub_tasks SET order_index = ?1 WHERE id = ?2",
            params![current.order_index, other.id],
        )?;
        tx.commit()?;

        tracing::info!(task_id, subtask_id, %direction, "moved sub-task");
        Ok(true)
    }

    fn apply_suggestions(
        &self,
        task_id: i64,
        subtask_candidates: &[String],
        material_candidates: &[String],
    ) -> Result<Option<SuggestionOutcome>> {
        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(task) = Self::query_task(&tx, task_id)? else {
            return Ok(None);
        };

        // Materials are stored one per line, so compare them line by line too.
        let material_candidates: Vec<&str> =
            material_candidates.iter().flat_map(|candidate| candidate.split('\n')).collect();
        let outcome = SuggestionOutcome {
            subtasks: merge_suggestions(&task.subtask_descriptions(), subtask_candidates),
            materials: merge_suggestions(&task.materials_needed, &material_candidates),
        };

        let mut order_index = Self::next_order_index(&tx, task_id)?;
        for description in &outcome.subtasks.accepted {
            Self::insert_subtask(&tx, task_id, description, order_index)?;
            order_index += 1;
        }

        if !outcome.materials.is_empty() {
            let mut materials = task.materials_needed;
            materials.extend(outcome.materials.accepted.iter().cloned());
            tx.execute(
                "UPDATE tasks SET materials_needed = ?1 WHERE id = ?2",
                params![join_materials(&materials), task_id],
            )?;
        }

        tx.commit()?;

        tracing::info!(
            task_id,
            added = outcome.added(),
            skipped = outcome.skipped(),
            "merged suggestions"
        );
        Ok(Some(outcome))
    }
}
