pub mod notion;

use async_trait::async_trait;

use crate::config::SyncSettings;
use crate::error::Result;
use crate::model::record::QueryPage;
use crate::model::schema::{CollectionSchema, RelationKey};

/// The three remote operations the sync needs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch one page of a collection. `None` asks for the first page.
    async fn query(&self, collection_id: &str, cursor: Option<&str>) -> Result<QueryPage>;

    async fn schema(&self, collection_id: &str) -> Result<CollectionSchema>;

    /// Replace the relation property of `record_id` with exactly `ids`.
    async fn set_relation(&self, record_id: &str, key: &RelationKey, ids: &[String]) -> Result<()>;
}

#[cfg(test)]
pub mod tests;

pub fn create_store(settings: &SyncSettings) -> Result<notion::NotionStore> {
    notion::NotionStore::new(
        settings.api_base.clone(),
        &settings.token,
        settings.page_size,
    )
}
