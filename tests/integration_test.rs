//! Integration tests for `chore_tracker`.

use chore_tracker::chores::{
    suggest_for_task, ChoreStore, Direction, SqliteChoreStore, Status, TaskUpdate,
};
use chore_tracker::config::SuggestionConfig;
use chore_tracker::error::{Error, ProviderError};
use chore_tracker::suggest::CommandSuggestionProvider;
use chore_tracker::testing::{MockCommandRunner, StubSuggestionProvider};
use chore_tracker::VERSION;
use tempfile::TempDir;

fn create_test_store() -> (TempDir, SqliteChoreStore) {
    let dir = TempDir::new().unwrap();
    let store = SqliteChoreStore::new(dir.path().join("chores.db")).unwrap();
    (dir, store)
}

fn descriptions(store: &SqliteChoreStore, task_id: i64) -> Vec<String> {
    store.get_subtasks_for_task(task_id).unwrap().into_iter().map(|st| st.description).collect()
}

#[test]
fn test_version_exists() {
    assert!(!VERSION.is_empty());
}

#[test]
fn test_real_command_runner() {
    use chore_tracker::command::RealCommandRunner;
    use chore_tracker::traits::CommandRunner;

    let runner = RealCommandRunner::new();
    let output = runner.run("echo", &["hello"], None).unwrap();
    assert!(output.success());
    assert!(output.stdout.contains("hello"));
}

#[test]
fn test_new_subtasks_get_dense_positions() {
    let (_dir, store) = create_test_store();
    let task = store.create_task("Clean garage", "", None, &[]).unwrap();

    for name in ["Sweep", "Sort boxes", "Hose floor", "Hang tools"] {
        store.add_subtask(task.id, name).unwrap().unwrap();
    }

    let indices: Vec<i64> =
        store.get_subtasks_for_task(task.id).unwrap().iter().map(|st| st.order_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn test_move_scenario() {
    let (_dir, store) = create_test_store();
    let task = store.create_task("Paint fence", "", None, &[]).unwrap();
    let a = store.add_subtask(task.id, "A").unwrap().unwrap();
    let b = store.add_subtask(task.id, "B").unwrap().unwrap();
    let c = store.add_subtask(task.id, "C").unwrap().unwrap();

    assert!(store.move_subtask(task.id, b.id, Direction::Up).unwrap());
    assert_eq!(descriptions(&store, task.id), vec!["B", "A", "C"]);

    assert!(!store.move_subtask(task.id, b.id, Direction::Up).unwrap());
    assert!(!store.move_subtask(task.id, c.id, Direction::Down).unwrap());
    assert_eq!(descriptions(&store, task.id), vec!["B", "A", "C"]);

    assert!(store.move_subtask(task.id, a.id, Direction::Down).unwrap());
    assert_eq!(descriptions(&store, task.id), vec!["B", "C", "A"]);
}

#[test]
fn test_move_rejects_subtask_of_another_chore() {
    let (_dir, store) = create_test_store();
    let first = store.create_task("First", "", None, &[]).unwrap();
    let second = store.create_task("Second", "", None, &[]).unwrap();
    store.add_subtask(first.id, "Stay").unwrap().unwrap();
    let foreign = store.add_subtask(second.id, "Elsewhere").unwrap().unwrap();

    assert!(!store.move_subtask(first.id, foreign.id, Direction::Up).unwrap());
    assert_eq!(descriptions(&store, second.id), vec!["Elsewhere"]);
}

#[test]
fn test_delete_keeps_remaining_order() {
    let (_dir, store) = create_test_store();
    let task = store.create_task("Tidy", "", None, &[]).unwrap();
    store.add_subtask(task.id, "A").unwrap().unwrap();
    let b = store.add_subtask(task.id, "B").unwrap().unwrap();
    store.add_subtask(task.id, "C").unwrap().unwrap();

    assert!(store.delete_subtask(b.id).unwrap());
    assert_eq!(descriptions(&store, task.id), vec!["A", "C"]);

    let d = store.add_subtask(task.id, "D").unwrap().unwrap();
    assert_eq!(d.order_index, 3);
    assert_eq!(descriptions(&store, task.id), vec!["A", "C", "D"]);
}

#[test]
fn test_delete_task_cascades() {
    let (_dir, store) = create_test_store();
    let task = store.create_task("Wash car", "", None, &[]).unwrap();
    let rinse = store.add_subtask(task.id, "Rinse").unwrap().unwrap();
    let dry = store.add_subtask(task.id, "Dry").unwrap().unwrap();

    assert!(store.delete_task(task.id).unwrap());
    assert!(store.get_task(task.id).unwrap().is_none());
    assert!(store.get_subtask(rinse.id).unwrap().is_none());
    assert!(store.get_subtask(dry.id).unwrap().is_none());
    assert!(store.get_subtasks_for_task(task.id).unwrap().is_empty());
    assert!(!store.delete_task(task.id).unwrap());
}

#[test]
fn test_partial_update_touches_only_given_fields() {
    let (_dir, store) = create_test_store();
    let due = chore_tracker::chores::parse_due_date("2024-06-01").unwrap();
    let task =
        store.create_task("Original", "Old notes", due, &["Bucket".to_string()]).unwrap();

    let update = TaskUpdate { notes: Some("x".to_string()), ..Default::default() };
    let updated = store.update_task_details(task.id, update).unwrap().unwrap();

    assert_eq!(updated.notes, "x");
    assert_eq!(updated.description, "Original");
    assert_eq!(updated.due_date, due);
    assert_eq!(updated.materials_needed, vec!["Bucket"]);
    assert_eq!(updated.status, Status::Pending);
}

#[test]
fn test_garden_suggestion_merge() {
    let (_dir, store) = create_test_store();
    let task = store.create_task("Tidy the garden", "", None, &[]).unwrap();
    store.add_subtask(task.id, "Rake leaves").unwrap().unwrap();

    let provider = StubSuggestionProvider::new(&["rake leaves", "Mow lawn"], &[] as &[&str]);
    let outcome = suggest_for_task(&store, &provider, task.id).unwrap().unwrap();

    assert_eq!(outcome.subtasks.added, 1);
    assert_eq!(outcome.subtasks.skipped, 1);
    assert_eq!(descriptions(&store, task.id), vec!["Rake leaves", "Mow lawn"]);

    let mow = &store.get_task(task.id).unwrap().unwrap().sub_tasks[1];
    assert_eq!(mow.order_index, 1);
    assert!(!mow.completed);
}

#[test]
fn test_materials_suggestion_merge() {
    let (_dir, store) = create_test_store();
    let materials = vec!["Hammer".to_string(), "Nails".to_string()];
    let task = store.create_task("Fix shelf", "", None, &materials).unwrap();

    let provider = StubSuggestionProvider::new(&[] as &[&str], &["nails", "Glue", "glue "]);
    let outcome = suggest_for_task(&store, &provider, task.id).unwrap().unwrap();

    assert_eq!(outcome.materials.added, 1);
    assert_eq!(outcome.materials.skipped, 2);
    let task = store.get_task(task.id).unwrap().unwrap();
    assert_eq!(task.materials_needed, vec!["Hammer", "Nails", "Glue"]);
}

#[test]
fn test_repeated_suggestions_are_idempotent() {
    let (_dir, store) = create_test_store();
    let task = store.create_task("Clean bathroom", "", None, &[]).unwrap();
    let provider = StubSuggestionProvider::new(&["Scrub tub", "Mop floor"], &["Bleach"]);

    let first = suggest_for_task(&store, &provider, task.id).unwrap().unwrap();
    assert_eq!(first.added(), 3);
    let after_first = store.get_task(task.id).unwrap().unwrap();

    let second = suggest_for_task(&store, &provider, task.id).unwrap().unwrap();
    assert_eq!(second.added(), 0);
    assert_eq!(second.skipped(), 3);
    assert_eq!(store.get_task(task.id).unwrap().unwrap(), after_first);
}

#[test]
fn test_provider_failure_persists_nothing() {
    let (_dir, store) = create_test_store();
    let task = store.create_task("Clean windows", "", None, &["Squeegee".to_string()]).unwrap();
    store.add_subtask(task.id, "Wipe frames").unwrap().unwrap();
    let before = store.get_task(task.id).unwrap().unwrap();

    let provider = StubSuggestionProvider::failing(ProviderError::Timeout { timeout_secs: 5 });
    let err = suggest_for_task(&store, &provider, task.id).unwrap_err();

    assert!(matches!(err, Error::Provider(ProviderError::Timeout { .. })));
    assert_eq!(store.get_task(task.id).unwrap().unwrap(), before);
}

#[test]
fn test_suggest_for_missing_task_skips_provider() {
    let (_dir, store) = create_test_store();
    let provider = StubSuggestionProvider::new(&["Anything"], &["Anything"]);

    assert!(suggest_for_task(&store, &provider, 404).unwrap().is_none());
    assert_eq!(provider.calls(), 0);
}

#[test]
#[serial_test::serial]
fn test_command_provider_end_to_end() {
    let (_dir, store) = create_test_store();
    let task = store.create_task("Clean oven", "", None, &[]).unwrap();
    store.add_subtask(task.id, "Remove racks").unwrap().unwrap();

    let mut runner = MockCommandRunner::new();
    runner.set_available("claude");
    runner.respond_with_stdout(
        "Sub-tasks:\n1. Remove racks\n2. Spray degreaser\n\nMaterials:\n- Degreaser\n- Gloves\n",
    );
    let provider = CommandSuggestionProvider::new(&runner, SuggestionConfig::default());

    let outcome = suggest_for_task(&store, &provider, task.id).unwrap().unwrap();
    assert_eq!(outcome.subtasks.accepted, vec!["Spray degreaser"]);
    assert_eq!(outcome.materials.accepted, vec!["Degreaser", "Gloves"]);

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let prompt = calls[0].args.last().unwrap();
    assert!(prompt.contains("Clean oven"));
    assert!(prompt.contains("Remove racks"));
    runner.verify();
}
