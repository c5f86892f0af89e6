use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SyncError};

pub const DEFAULT_API_BASE: &str = "https://api.notion.com/v1";
pub const DEFAULT_VERSION_PROP: &str = "Product Version";
pub const DEFAULT_RELATION_PROP: &str = "Bug Tracking System";
pub const DEFAULT_PAGE_DELAY_MS: u64 = 200;
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Notion rejects larger page sizes.
const MAX_PAGE_SIZE: u32 = 100;

/// Contents of `config.toml`. Every field is optional; flags and env vars win.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub notion: Option<NotionConfig>,
    pub properties: Option<PropertiesConfig>,
    pub sync: Option<SyncOptions>,
}

#[derive(Debug, Deserialize, Default)]
pub struct NotionConfig {
    pub token: Option<String>,
    pub task_db_id: Option<String>,
    pub bts_db_id: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PropertiesConfig {
    pub task_version: Option<String>,
    pub bts_version: Option<String>,
    pub task_relation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SyncOptions {
    pub page_delay_ms: Option<u64>,
    pub page_size: Option<u32>,
    pub strict_schema: Option<bool>,
    pub detect_from_record: Option<bool>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub token: Option<String>,
    pub task_db_id: Option<String>,
    pub bts_db_id: Option<String>,
    pub task_version_prop: Option<String>,
    pub bts_version_prop: Option<String>,
    pub relation_fallback: Option<String>,
    pub api_base: Option<String>,
    pub page_delay_ms: Option<u64>,
    pub page_size: Option<u32>,
    pub strict_schema: bool,
    pub detect_from_record: bool,
    pub dry_run: bool,
}

/// Fully resolved settings for one run.
#[derive(Clone)]
pub struct SyncSettings {
    pub token: String,
    pub task_db_id: String,
    pub bts_db_id: String,
    pub task_version_prop: String,
    pub bts_version_prop: String,
    pub relation_fallback: String,
    pub api_base: String,
    pub page_delay: Duration,
    pub page_size: u32,
    pub strict_schema: bool,
    /// Detect the relation from a task page instead of the database schema.
    pub detect_from_record: bool,
    pub dry_run: bool,
}

impl fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSettings")
            .field("token", &"<redacted>")
            .field("task_db_id", &self.task_db_id)
            .field("bts_db_id", &self.bts_db_id)
            .field("task_version_prop", &self.task_version_prop)
            .field("bts_version_prop", &self.bts_version_prop)
            .field("relation_fallback", &self.relation_fallback)
            .field("api_base", &self.api_base)
            .field("page_delay", &self.page_delay)
            .field("page_size", &self.page_size)
            .field("strict_schema", &self.strict_schema)
            .field("detect_from_record", &self.detect_from_record)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bts-sync")
        .join("config.toml")
}

/// Load the config file. A missing default file is fine, a missing explicit one is not.
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let default = config_path();
            if !default.exists() {
                return Ok(FileConfig::default());
            }
            default
        }
    };
    let contents = std::fs::read_to_string(&path).map_err(|e| SyncError::ConfigFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    toml::from_str(&contents).map_err(|e| SyncError::ConfigFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

// CI injects unset secrets as empty strings.
fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<SyncSettings> {
    let notion = file.notion.unwrap_or_default();
    let props = file.properties.unwrap_or_default();
    let sync = file.sync.unwrap_or_default();

    let token = present(overrides.token).or_else(|| present(notion.token));
    let task_db_id = present(overrides.task_db_id).or_else(|| present(notion.task_db_id));
    let bts_db_id = present(overrides.bts_db_id).or_else(|| present(notion.bts_db_id));

    let (token, task_db_id, bts_db_id) = match (token, task_db_id, bts_db_id) {
        (Some(t), Some(a), Some(b)) => (t, a, b),
        (t, a, b) => {
            let mut missing = Vec::new();
            if t.is_none() {
                missing.push("NOTION_TOKEN");
            }
            if a.is_none() {
                missing.push("TASK_DB_ID");
            }
            if b.is_none() {
                missing.push("BTS_DB_ID");
            }
            return Err(SyncError::Config(missing));
        }
    };

    let page_size = overrides
        .page_size
        .or(sync.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(SyncError::InvalidConfig(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
        )));
    }

    Ok(SyncSettings {
        token,
        task_db_id,
        bts_db_id,
        task_version_prop: present(overrides.task_version_prop)
            .or_else(|| present(props.task_version))
            .unwrap_or_else(|| DEFAULT_VERSION_PROP.to_string()),
        bts_version_prop: present(overrides.bts_version_prop)
            .or_else(|| present(props.bts_version))
            .unwrap_or_else(|| DEFAULT_VERSION_PROP.to_string()),
        relation_fallback: present(overrides.relation_fallback)
            .or_else(|| present(props.task_relation))
            .unwrap_or_else(|| DEFAULT_RELATION_PROP.to_string()),
        api_base: present(overrides.api_base)
            .or_else(|| present(notion.api_base))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        page_delay: Duration::from_millis(
            overrides
                .page_delay_ms
                .or(sync.page_delay_ms)
                .unwrap_or(DEFAULT_PAGE_DELAY_MS),
        ),
        page_size,
        strict_schema: overrides.strict_schema || sync.strict_schema.unwrap_or(false),
        detect_from_record: overrides.detect_from_record
            || sync.detect_from_record.unwrap_or(false),
        dry_run: overrides.dry_run,
    })
}
