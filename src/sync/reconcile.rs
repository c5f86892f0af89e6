use chrono::Utc;
use tracing::{info, warn};

use crate::config::SyncSettings;
use crate::error::Result;
use crate::model::record::Record;
use crate::model::schema::RelationKey;
use crate::store::RecordStore;
use crate::sync::extract::{extract_title, extract_versions};
use crate::sync::fetch::fetch_all;
use crate::sync::index::VersionIndex;
use crate::sync::report::{RunSummary, TaskOutcome};
use crate::sync::resolve::{resolve_from_record, resolve_relation_key, Resolution};
use crate::sync::writer::{dedup_capped, replace_relation};

/// One sync run: fetch both databases, index bug items by version, rewrite
/// every versioned task's relation.
pub struct Reconciler<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    settings: &'a SyncSettings,
}

impl<'a, S: RecordStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S, settings: &'a SyncSettings) -> Self {
        Self { store, settings }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let s = self.settings;

        info!(store = self.store.name(), "querying databases");
        let tasks = fetch_all(self.store, &s.task_db_id, s.page_delay).await?;
        let bug_items = fetch_all(self.store, &s.bts_db_id, s.page_delay).await?;

        let index = VersionIndex::build(&bug_items, &s.bts_version_prop);
        info!(versions = index.len(), bug_items = bug_items.len(), "bug tracker indexed");
        if index.is_empty() {
            warn!(
                property = %s.bts_version_prop,
                "no bug item has a version; every task will be cleared"
            );
        }

        let relation = self.resolve(&tasks).await?;
        let key = if s.strict_schema {
            relation.clone().require_resolved(&s.bts_db_id)?
        } else {
            relation.key().clone()
        };

        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut updated = 0;
        let mut skipped = 0;

        for task in &tasks {
            let title = extract_title(task);
            let versions = extract_versions(task, &s.task_version_prop);
            if versions.is_empty() {
                info!(task = %title, "skip: task has no version");
                skipped += 1;
                outcomes.push(TaskOutcome::Skipped {
                    task_id: task.id.clone(),
                    title,
                });
                continue;
            }

            let matched = index.matches(&versions);
            info!(task = %title, ?versions, matched = matched.len(), "matched bug items");

            let related = if s.dry_run {
                dedup_capped(&matched)
            } else {
                replace_relation(self.store, &task.id, &key, &matched).await?
            };
            updated += 1;
            outcomes.push(TaskOutcome::Updated {
                task_id: task.id.clone(),
                title,
                versions: versions.into_iter().collect(),
                related,
            });
        }

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            dry_run: s.dry_run,
            tasks_seen: tasks.len(),
            updated,
            skipped,
            bug_items: bug_items.len(),
            versions_indexed: index.len(),
            relation,
            outcomes,
        })
    }

    async fn resolve(&self, tasks: &[Record]) -> Result<Resolution> {
        let s = self.settings;
        if !s.detect_from_record {
            return resolve_relation_key(
                self.store,
                &s.task_db_id,
                &s.bts_db_id,
                &s.relation_fallback,
            )
            .await;
        }
        Ok(match tasks.first() {
            Some(task) => resolve_from_record(task, &s.bts_db_id, &s.relation_fallback),
            None => Resolution::FellBack {
                key: RelationKey::Name(s.relation_fallback.clone()),
                reason: "task database is empty".into(),
            },
        })
    }
}
