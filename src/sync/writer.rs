use std::collections::HashSet;

use tracing::error;

use crate::error::{Result, SyncError};
use crate::model::schema::RelationKey;
use crate::store::RecordStore;

/// Upper bound on ids written to one relation.
pub const MAX_RELATION_IDS: usize = 200;

/// Dedup preserving first-seen order, then cap.
pub fn dedup_capped(candidates: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|id| seen.insert(*id))
        .take(MAX_RELATION_IDS)
        .cloned()
        .collect()
}

/// Replace the task's relation with the deduplicated, capped candidate list.
///
/// Returns the ids that were written. A failed update is logged and returned
/// as-is so the caller aborts the run.
pub async fn replace_relation<S: RecordStore + ?Sized>(
    store: &S,
    task_id: &str,
    key: &RelationKey,
    candidates: &[String],
) -> Result<Vec<String>> {
    let ids = dedup_capped(candidates);
    if let Err(err) = store.set_relation(task_id, key, &ids).await {
        match &err {
            SyncError::Transport { status, body, .. } => {
                error!(task_id, status, %body, "relation update failed");
            }
            other => error!(task_id, error = %other, "relation update failed"),
        }
        return Err(err);
    }
    Ok(ids)
}
