use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sync::resolve::Resolution;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// No version value; nothing written.
    Skipped { task_id: String, title: String },
    Updated {
        task_id: String,
        title: String,
        versions: Vec<String>,
        related: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub tasks_seen: usize,
    pub updated: usize,
    pub skipped: usize,
    pub bug_items: usize,
    pub versions_indexed: usize,
    pub relation: Resolution,
    pub outcomes: Vec<TaskOutcome>,
}

impl RunSummary {
    pub fn render_text(&self) -> String {
        let verb = if self.dry_run { "would update" } else { "updated" };
        let mut line = format!(
            "[done] {verb} {} task(s), skipped {} without version ({} tasks, {} bug items, {} versions) in {}s",
            self.updated,
            self.skipped,
            self.tasks_seen,
            self.bug_items,
            self.versions_indexed,
            (self.finished_at - self.started_at).num_seconds(),
        );
        if self.relation.is_fallback() {
            line.push_str(&format!(" [relation fallback: {}]", self.relation.key().as_str()));
        }
        line
    }
}
