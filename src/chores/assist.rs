//! One AI-suggestion request, end to end.

use crate::chores::store::{ChoreStore, SuggestionOutcome};
use crate::error::Result;
use crate::traits::SuggestionProvider;

/// Ask `provider` for sub-tasks and materials for a chore and merge them in.
///
/// The provider is called before any write and outside any transaction. If
/// it fails, the error is returned and the chore is left untouched. Returns
/// `Ok(None)` if the chore does not exist, either before the provider call or
/// by the time its reply is merged.
///
/// # Errors
///
/// Returns `Error::Provider` if the provider fails, or a storage error if the
/// merge cannot be persisted.
pub fn suggest_for_task(
    store: &dyn ChoreStore,
    provider: &dyn SuggestionProvider,
    task_id: i64,
) -> Result<Option<SuggestionOutcome>> {
    let Some(task) = store.get_task(task_id)? else {
        return Ok(None);
    };

    let suggestions =
        provider.suggest(&task.description, &task.subtask_descriptions()).map_err(|e| {
            tracing::warn!(task_id, error = %e, "suggestion provider failed");
            e
        })?;

    store.apply_suggestions(task_id, &suggestions.subtasks, &suggestions.materials)
}
