use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::config::{self, Overrides};
use crate::error::Result;
use crate::store;
use crate::sync::{Reconciler, RunSummary};

/// Link every Notion task to the bug-tracker items that share its product version.
///
/// Each task's relation is replaced with the full list of matching bug items,
/// so running twice in a row changes nothing.
#[derive(Parser, Debug)]
#[command(name = "bts-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Task database id
    #[arg(long, env = "TASK_DB_ID")]
    pub task_db: Option<String>,

    /// Bug Tracking System database id
    #[arg(long, env = "BTS_DB_ID")]
    pub bts_db: Option<String>,

    /// Version property on tasks [default: Product Version]
    #[arg(long, env = "TASK_VER_PROP")]
    pub task_version_prop: Option<String>,

    /// Version property on bug items [default: Product Version]
    #[arg(long, env = "BTS_VER_PROP")]
    pub bts_version_prop: Option<String>,

    /// Relation property name used when schema detection fails [default: Bug Tracking System]
    #[arg(long, env = "TASK_REL_PROP")]
    pub relation_prop: Option<String>,

    /// Config file (defaults to ~/.bts-sync/config.toml when present)
    #[arg(long, env = "BTS_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// API base URL
    #[arg(long, env = "NOTION_API_BASE")]
    pub api_base: Option<String>,

    /// Pause between paginated requests, in milliseconds [default: 200]
    #[arg(long)]
    pub page_delay_ms: Option<u64>,

    /// Records per query page, 1-100 [default: 100]
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Fail instead of falling back when the relation property can't be detected
    #[arg(long)]
    pub strict_schema: bool,

    /// Detect the relation property from a task page instead of the database schema
    #[arg(long)]
    pub detect_from_record: bool,

    /// Compute matches without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            task_db_id: self.task_db.clone(),
            bts_db_id: self.bts_db.clone(),
            task_version_prop: self.task_version_prop.clone(),
            bts_version_prop: self.bts_version_prop.clone(),
            relation_fallback: self.relation_prop.clone(),
            api_base: self.api_base.clone(),
            page_delay_ms: self.page_delay_ms,
            page_size: self.page_size,
            strict_schema: self.strict_schema,
            detect_from_record: self.detect_from_record,
            dry_run: self.dry_run,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let file = config::load_config(self.config.as_deref())?;
        let settings = config::resolve(self.overrides(), file)?;
        tracing::debug!(?settings, "resolved settings");

        let store = store::create_store(&settings)?;
        Reconciler::new(&store, &settings).run().await
    }
}

pub fn print_summary(summary: &RunSummary, json: bool) -> anyhow::Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
        println!("{rendered}");
    } else {
        println!("{}", summary.render_text());
    }
    Ok(())
}
