//! Tests for the CLI module.

use super::*;
use crate::paths::HOME_ENV_VAR;
use clap::Parser;
use serde_json::Value;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

/// Points `CHORES_HOME` at a temp directory for the life of the guard.
struct HomeGuard {
    dir: TempDir,
    original: Option<std::ffi::OsString>,
}

impl HomeGuard {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let original = std::env::var_os(HOME_ENV_VAR);
        std::env::set_var(HOME_ENV_VAR, dir.path());
        Self { dir, original }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run `chores <args>` against this home's default database.
    fn run(&self, args: &[&str]) -> CliOutput {
        let argv = std::iter::once("chores").chain(args.iter().copied());
        run(Cli::try_parse_from(argv).unwrap())
    }

    /// Run and parse stdout as JSON, asserting success.
    fn run_json(&self, args: &[&str]) -> Value {
        let output = self.run(args);
        assert_eq!(output.exit_code, ExitCode::SUCCESS, "stderr: {:?}", output.stderr);
        serde_json::from_str(&output.stdout[0]).unwrap()
    }

    fn write_config(&self, yaml: &str) {
        std::fs::write(self.path().join("config.yaml"), yaml).unwrap();
    }
}

impl Drop for HomeGuard {
    fn drop(&mut self) {
        match self.original.take() {
            Some(value) => std::env::set_var(HOME_ENV_VAR, value),
            None => std::env::remove_var(HOME_ENV_VAR),
        }
    }
}

/// Create an executable script that prints `reply` and exits with `code`.
#[cfg(unix)]
fn fake_llm(dir: &Path, reply: &str, code: i32) -> String {
    use std::os::unix::fs::PermissionsExt;

    let script_path = dir.join("fake-llm");
    std::fs::write(&script_path, format!("#!/bin/sh\ncat <<'REPLY'\n{reply}\nREPLY\nexit {code}\n"))
        .unwrap();
    std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755)).unwrap();
    script_path.display().to_string()
}

fn descriptions(value: &Value) -> Vec<String> {
    value.as_array().unwrap().iter().map(|st| st["description"].as_str().unwrap().to_string()).collect()
}

#[test]
fn test_parse_sub_move() {
    let cli = Cli::try_parse_from(["chores", "sub", "move", "1", "2", "up"]).unwrap();
    match cli.command {
        Command::Sub(SubCommand::Move { task_id, id, direction }) => {
            assert_eq!((task_id, id, direction.as_str()), (1, 2, "up"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_global_db_option() {
    let cli = Cli::try_parse_from(["chores", "list", "--db", "/tmp/x.db"]).unwrap();
    assert_eq!(cli.db.as_deref(), Some(Path::new("/tmp/x.db")));
}

#[test]
fn test_parse_edit_rejects_conflicting_material_flags() {
    let result =
        Cli::try_parse_from(["chores", "edit", "1", "--material", "Mop", "--clear-materials"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_repeated_materials() {
    let cli = Cli::try_parse_from(["chores", "add", "Paint", "-m", "Brush", "-m", "Tape"]).unwrap();
    match cli.command {
        Command::Add { materials, .. } => assert_eq!(materials, vec!["Brush", "Tape"]),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_command_needs_store() {
    assert!(!Command::Version.needs_store());
    assert!(!Command::EnsureConfig.needs_store());
    assert!(Command::List.needs_store());
    assert!(Command::Suggest { id: 1 }.needs_store());
}

#[test]
fn test_run_version() {
    let output = run(Cli::try_parse_from(["chores", "version"]).unwrap());
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stderr[0].contains("chores v"));
}

#[test]
#[serial_test::serial]
fn test_add_show_and_list() {
    let home = HomeGuard::new();

    let task = home.run_json(&["add", "Clean the kitchen", "--due", "2024-12-25", "-m", "Sponge"]);
    assert_eq!(task["description"], "Clean the kitchen");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["due_date"], "2024-12-25");
    assert_eq!(task["materials_needed"][0], "Sponge");
    let id = task["id"].as_i64().unwrap().to_string();

    home.run_json(&["sub", "add", &id, "Wash dishes"]);
    let shown = home.run_json(&["show", &id]);
    assert_eq!(shown["sub_tasks"][0]["description"], "Wash dishes");

    let list = home.run_json(&["list"]);
    assert_eq!(list[0]["subtasks_total"], 1);
    assert_eq!(list[0]["subtasks_done"], 0);
    assert!(home.path().join("chores.sqlite3").exists());
}

#[test]
#[serial_test::serial]
fn test_explicit_db_path() {
    let home = HomeGuard::new();
    let db = home.path().join("elsewhere.db");
    let db = db.to_str().unwrap();

    home.run_json(&["--db", db, "add", "Vacuum"]);
    assert!(Path::new(db).exists());
    assert!(!home.path().join("chores.sqlite3").exists());
}

#[test]
#[serial_test::serial]
fn test_add_rejects_bad_input() {
    let home = HomeGuard::new();

    let output = home.run(&["add", "   "]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("cannot be empty"));

    let output = home.run(&["add", "Mop", "--due", "tomorrow"]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("invalid due date"));

    assert_eq!(home.run_json(&["list"]), Value::Array(vec![]));
}

#[test]
#[serial_test::serial]
fn test_status_command() {
    let home = HomeGuard::new();
    let id = home.run_json(&["add", "Laundry"])["id"].as_i64().unwrap().to_string();

    let task = home.run_json(&["status", &id, "in progress"]);
    assert_eq!(task["status"], "in_progress");

    let output = home.run(&["status", &id, "invalid_state"]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("invalid status"));

    let output = home.run(&["status", "999", "completed"]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("Chore not found: 999"));
}

#[test]
#[serial_test::serial]
fn test_edit_only_changes_given_fields() {
    let home = HomeGuard::new();
    let task =
        home.run_json(&["add", "Original", "-n", "Old notes", "--due", "2023-01-01", "-m", "Rag"]);
    let id = task["id"].as_i64().unwrap().to_string();

    let task = home.run_json(&["edit", &id, "--notes", "x"]);
    assert_eq!(task["notes"], "x");
    assert_eq!(task["description"], "Original");
    assert_eq!(task["due_date"], "2023-01-01");
    assert_eq!(task["materials_needed"][0], "Rag");

    let task = home.run_json(&["edit", &id, "--due", "", "--clear-materials"]);
    assert!(task["due_date"].is_null());
    assert_eq!(task["materials_needed"], Value::Array(vec![]));
}

#[test]
#[serial_test::serial]
fn test_subtask_commands() {
    let home = HomeGuard::new();
    let id = home.run_json(&["add", "Garden"])["id"].as_i64().unwrap().to_string();
    let a = home.run_json(&["sub", "add", &id, "A"])["id"].as_i64().unwrap().to_string();
    let b = home.run_json(&["sub", "add", &id, "B"])["id"].as_i64().unwrap().to_string();
    home.run_json(&["sub", "add", &id, "C"]);

    let order = home.run_json(&["sub", "move", &id, &b, "up"]);
    assert_eq!(descriptions(&order), vec!["B", "A", "C"]);

    let output = home.run(&["sub", "move", &id, &b, "up"]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("Cannot move"));

    let output = home.run(&["sub", "move", &id, &b, "sideways"]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("invalid direction"));

    let toggled = home.run_json(&["sub", "toggle", &a]);
    assert_eq!(toggled["completed"], true);
    let toggled = home.run_json(&["sub", "toggle", &a]);
    assert_eq!(toggled["completed"], false);

    let edited = home.run_json(&["sub", "edit", &a, "--description", "A2", "--completed", "true"]);
    assert_eq!(edited["description"], "A2");
    assert_eq!(edited["completed"], true);

    let output = home.run(&["sub", "delete", &a]);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    let output = home.run(&["sub", "delete", &a]);
    assert!(output.stderr[0].contains("Sub-task not found"));

    let output = home.run(&["sub", "add", "999", "Orphan"]);
    assert!(output.stderr[0].contains("Chore not found: 999"));
}

#[test]
#[serial_test::serial]
fn test_delete_command() {
    let home = HomeGuard::new();
    let id = home.run_json(&["add", "Temporary"])["id"].as_i64().unwrap().to_string();
    home.run_json(&["sub", "add", &id, "Step"]);

    let output = home.run(&["delete", &id]);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout[0].contains("Chore deleted"));

    let output = home.run(&["show", &id]);
    assert_eq!(output.exit_code, ExitCode::from(1));
}

#[test]
#[serial_test::serial]
fn test_ensure_config() {
    let home = HomeGuard::new();

    let output = home.run(&["ensure-config"]);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stderr[0].contains("Wrote default config"));
    assert!(home.path().join("config.yaml").exists());

    let output = home.run(&["ensure-config"]);
    assert!(output.stderr[0].contains("already present"));
}

#[test]
#[serial_test::serial]
fn test_invalid_config_is_reported() {
    let home = HomeGuard::new();
    home.write_config("suggestions: 42");

    let output = home.run(&["list"]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("Error loading config"));
}

#[cfg(unix)]
#[test]
#[serial_test::serial]
fn test_suggest_merges_command_reply() {
    crate::templates::reset_cache().unwrap();
    let home = HomeGuard::new();
    let script = fake_llm(
        home.path(),
        "Sub-tasks:\n1. Mow the lawn\n2. Water the plants\n\nMaterials:\n- Gloves\n- Shears",
        0,
    );
    home.write_config(&format!("suggestions:\n  command: {script}\n  args: []\n"));

    let id = home.run_json(&["add", "Maintain the garden"])["id"].as_i64().unwrap().to_string();
    home.run_json(&["sub", "add", &id, "Water the plants"]);

    let outcome = home.run_json(&["suggest", &id]);
    assert_eq!(outcome["subtasks"]["accepted"][0], "Mow the lawn");
    assert_eq!(outcome["subtasks"]["skipped"], 1);
    assert_eq!(outcome["materials"]["added"], 2);

    let again = home.run_json(&["suggest", &id]);
    assert_eq!(again["subtasks"]["added"], 0);
    assert_eq!(again["materials"]["added"], 0);

    let task = home.run_json(&["show", &id]);
    assert_eq!(task["sub_tasks"].as_array().unwrap().len(), 2);
    assert_eq!(task["materials_needed"], serde_json::json!(["Gloves", "Shears"]));
}

#[cfg(unix)]
#[test]
#[serial_test::serial]
fn test_suggest_failure_leaves_chore_untouched() {
    crate::templates::reset_cache().unwrap();
    let home = HomeGuard::new();
    let script = fake_llm(home.path(), "1. Should not be used", 3);
    home.write_config(&format!("suggestions:\n  command: {script}\n  args: []\n"));

    let id = home.run_json(&["add", "Paint"])["id"].as_i64().unwrap().to_string();
    let output = home.run(&["suggest", &id]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("exit code 3"));

    let task = home.run_json(&["show", &id]);
    assert_eq!(task["sub_tasks"], Value::Array(vec![]));
}

#[test]
#[serial_test::serial]
fn test_suggest_missing_command() {
    let home = HomeGuard::new();
    home.write_config("suggestions:\n  command: definitely_not_a_real_command_12345\n");

    let id = home.run_json(&["add", "Paint"])["id"].as_i64().unwrap().to_string();
    let output = home.run(&["suggest", &id]);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("suggestions unavailable"));
}
