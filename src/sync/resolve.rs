use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SyncError};
use crate::model::record::{PropertyValue, Record};
use crate::model::schema::RelationKey;
use crate::store::RecordStore;
use crate::util::text::normalize_id;

/// Outcome of looking up the relation property that points at the bug tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved { key: RelationKey },
    FellBack { key: RelationKey, reason: String },
}

impl Resolution {
    pub fn key(&self) -> &RelationKey {
        match self {
            Resolution::Resolved { key } | Resolution::FellBack { key, .. } => key,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::FellBack { .. })
    }

    /// Reject a fallback when the caller wants exact schema detection.
    pub fn require_resolved(self, target: &str) -> Result<RelationKey> {
        match self {
            Resolution::Resolved { key } => Ok(key),
            Resolution::FellBack { reason, .. } => Err(SyncError::SchemaResolution {
                target: target.to_string(),
                reason,
            }),
        }
    }
}

fn fallback(name: &str, reason: String) -> Resolution {
    warn!(fallback = name, "{reason}; falling back to configured relation name");
    Resolution::FellBack {
        key: RelationKey::Name(name.to_string()),
        reason,
    }
}

/// Find the task property whose relation targets `target_collection_id`.
///
/// Display names are ignored, so emoji prefixes and renames don't matter. When
/// several properties target the collection the first by property name wins.
pub async fn resolve_relation_key<S: RecordStore + ?Sized>(
    store: &S,
    task_collection_id: &str,
    target_collection_id: &str,
    fallback_name: &str,
) -> Result<Resolution> {
    let schema = store.schema(task_collection_id).await?;
    debug!(schema = %schema.id, properties = schema.properties.len(), "read task schema");
    let target = normalize_id(target_collection_id);

    let mut matches = schema.properties.iter().filter(|(_, prop)| {
        prop.relation_target()
            .map(|t| normalize_id(t) == target)
            .unwrap_or(false)
    });

    let Some((name, prop)) = matches.next() else {
        return Ok(fallback(
            fallback_name,
            format!("no relation property in {task_collection_id} targets {target_collection_id}"),
        ));
    };

    let others: Vec<&str> = matches.map(|(n, _)| n.as_str()).collect();
    if !others.is_empty() {
        warn!(chosen = %name, ?others, "several relation properties target the bug tracker");
    }

    let key = if prop.id.is_empty() {
        RelationKey::Name(name.clone())
    } else {
        RelationKey::Id(prop.id.clone())
    };
    let shown = prop.name.as_deref().unwrap_or(name);
    info!(property = %shown, %key, "detected relation property");
    Ok(Resolution::Resolved { key })
}

/// Stricter variant: look only at the relation properties present on one task page.
pub fn resolve_from_record(
    record: &Record,
    target_collection_id: &str,
    fallback_name: &str,
) -> Resolution {
    let target = normalize_id(target_collection_id);
    let mut names: Vec<&String> = record.properties.keys().collect();
    names.sort();

    for name in names {
        let prop = &record.properties[name];
        if let PropertyValue::Relation {
            target_database: Some(db),
            ..
        } = &prop.value
        {
            if normalize_id(db) == target {
                let key = match &prop.id {
                    Some(id) if !id.is_empty() => RelationKey::Id(id.clone()),
                    _ => RelationKey::Name(name.clone()),
                };
                return Resolution::Resolved { key };
            }
        }
    }

    fallback(
        fallback_name,
        format!("page {} has no relation property targeting {target_collection_id}", record.id),
    )
}
