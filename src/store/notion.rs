use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::RecordStore;
use crate::error::{Result, SyncError};
use crate::model::record::QueryPage;
use crate::model::schema::{CollectionSchema, RelationKey};

pub const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionStore {
    base_url: String,
    page_size: u32,
    client: reqwest::Client,
}

impl NotionStore {
    pub fn new(base_url: String, token: &str, page_size: u32) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            SyncError::InvalidConfig(
                "NOTION_TOKEN contains characters not allowed in a header".into(),
            )
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
            client,
        })
    }
}

/// Turn a non-success response into a `Transport` error carrying the body.
async fn ensure_success(resp: reqwest::Response, operation: String) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Transport {
        operation,
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| SyncError::Decode {
        what: what.to_string(),
        message: e.to_string(),
    })
}

fn query_body(cursor: Option<&str>, page_size: u32) -> serde_json::Value {
    let mut body = serde_json::json!({ "page_size": page_size });
    if let Some(cursor) = cursor {
        body["start_cursor"] = serde_json::Value::String(cursor.to_string());
    }
    body
}

fn relation_body(key: &RelationKey, ids: &[String]) -> serde_json::Value {
    let refs: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| serde_json::json!({ "id": id }))
        .collect();
    let mut properties = serde_json::Map::new();
    properties.insert(key.as_str().to_string(), serde_json::json!({ "relation": refs }));
    serde_json::json!({ "properties": properties })
}

#[async_trait]
impl RecordStore for NotionStore {
    fn name(&self) -> &str {
        "Notion"
    }

    async fn query(&self, collection_id: &str, cursor: Option<&str>) -> Result<QueryPage> {
        let url = format!("{}/databases/{collection_id}/query", self.base_url);
        debug!(%url, cursor, "querying database page");
        let resp = self
            .client
            .post(&url)
            .json(&query_body(cursor, self.page_size))
            .send()
            .await?;
        let resp = ensure_success(resp, format!("query database {collection_id}")).await?;
        decode(resp, "database query response").await
    }

    async fn schema(&self, collection_id: &str) -> Result<CollectionSchema> {
        let url = format!("{}/databases/{collection_id}", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let resp = ensure_success(resp, format!("read schema of {collection_id}")).await?;
        decode(resp, "database schema").await
    }

    async fn set_relation(&self, record_id: &str, key: &RelationKey, ids: &[String]) -> Result<()> {
        let url = format!("{}/pages/{record_id}", self.base_url);
        let resp = self
            .client
            .patch(&url)
            .json(&relation_body(key, ids))
            .send()
            .await?;
        ensure_success(resp, format!("update page {record_id}")).await?;
        Ok(())
    }
}
