use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use super::RecordStore;
use crate::error::{Result, SyncError};
use crate::model::record::{
    Property, PropertyValue, QueryPage, Record, RelationRef, RichText, SelectOption,
};
use crate::model::schema::{CollectionSchema, RelationConfig, RelationKey, SchemaProperty};

/// In-memory store that pages collections and records every write.
pub struct MockStore {
    collections: Mutex<HashMap<String, Vec<Record>>>,
    schemas: HashMap<String, CollectionSchema>,
    page_size: usize,
    failing_status: HashMap<String, u16>,
    drop_cursor: bool,
    pub queries: Arc<Mutex<Vec<(String, Option<String>)>>>,
    pub schema_reads: Arc<Mutex<usize>>,
    pub writes: Arc<Mutex<Vec<(String, RelationKey, Vec<String>)>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            schemas: HashMap::new(),
            page_size: 100,
            failing_status: HashMap::new(),
            drop_cursor: false,
            queries: Arc::new(Mutex::new(Vec::new())),
            schema_reads: Arc::new(Mutex::new(0)),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_collection(self, id: &str, records: Vec<Record>) -> Self {
        self.collections.lock().unwrap().insert(id.to_string(), records);
        self
    }

    pub fn with_schema(mut self, id: &str, schema: CollectionSchema) -> Self {
        self.schemas.insert(id.to_string(), schema);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Make every request touching `id` (collection or page) fail with `status`.
    pub fn failing(mut self, id: &str, status: u16) -> Self {
        self.failing_status.insert(id.to_string(), status);
        self
    }

    /// Report `has_more` without a `next_cursor`, as a misbehaving API would.
    pub fn without_next_cursor(mut self) -> Self {
        self.drop_cursor = true;
        self
    }

    pub fn relation_of(&self, collection: &str, record_id: &str, property: &str) -> Vec<String> {
        let collections = self.collections.lock().unwrap();
        let record = collections[collection]
            .iter()
            .find(|r| r.id == record_id)
            .expect("record exists");
        match record.property(property).map(|p| &p.value) {
            Some(PropertyValue::Relation { refs, .. }) => {
                refs.iter().map(|r| r.id.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    fn check(&self, id: &str, operation: &str) -> Result<()> {
        match self.failing_status.get(id) {
            Some(status) => Err(SyncError::Transport {
                operation: format!("{operation} {id}"),
                status: *status,
                body: r#"{"object":"error","code":"mock"}"#.into(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordStore for MockStore {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn query(&self, collection_id: &str, cursor: Option<&str>) -> Result<QueryPage> {
        self.queries
            .lock()
            .unwrap()
            .push((collection_id.to_string(), cursor.map(String::from)));
        self.check(collection_id, "query database")?;

        let collections = self.collections.lock().unwrap();
        let records = collections.get(collection_id).cloned().unwrap_or_default();
        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let end = (start + self.page_size).min(records.len());
        let has_more = end < records.len();

        Ok(QueryPage {
            results: records[start..end].to_vec(),
            has_more,
            next_cursor: (has_more && !self.drop_cursor).then(|| end.to_string()),
        })
    }

    async fn schema(&self, collection_id: &str) -> Result<CollectionSchema> {
        *self.schema_reads.lock().unwrap() += 1;
        self.check(collection_id, "read schema of")?;
        Ok(self
            .schemas
            .get(collection_id)
            .cloned()
            .unwrap_or_else(|| schema(collection_id, vec![])))
    }

    async fn set_relation(&self, record_id: &str, key: &RelationKey, ids: &[String]) -> Result<()> {
        self.check(record_id, "update page")?;
        self.writes
            .lock()
            .unwrap()
            .push((record_id.to_string(), key.clone(), ids.to_vec()));

        let mut collections = self.collections.lock().unwrap();
        for record in collections.values_mut().flat_map(|c| c.iter_mut()) {
            if record.id == record_id {
                record.properties.insert(
                    key.as_str().to_string(),
                    Property {
                        id: None,
                        value: PropertyValue::Relation {
                            refs: ids.iter().map(|id| RelationRef { id: id.clone() }).collect(),
                            target_database: None,
                        },
                    },
                );
            }
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct LogBuffer {
    buffer: Arc<Mutex<Vec<u8>>>,
}

pub struct LogBufferGuard {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.buffer.lock().unwrap().clone()).unwrap()
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferGuard {
            buffer: self.buffer.clone(),
        }
    }
}

impl Write for LogBufferGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Capture warnings on the current thread until the guard drops.
pub fn capture_warnings() -> (DefaultGuard, LogBuffer) {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(Level::WARN)
        .with_ansi(false)
        .finish();
    (tracing::subscriber::set_default(subscriber), logs)
}

pub fn record(id: &str, props: Vec<(&str, PropertyValue)>) -> Record {
    Record {
        id: id.to_string(),
        properties: props
            .into_iter()
            .map(|(name, value)| (name.to_string(), Property { id: None, value }))
            .collect(),
    }
}

pub fn option(name: &str) -> SelectOption {
    SelectOption {
        name: name.to_string(),
    }
}

pub fn select(name: &str) -> PropertyValue {
    PropertyValue::Select(Some(option(name)))
}

pub fn text(s: &str) -> Vec<RichText> {
    vec![RichText {
        plain_text: s.to_string(),
    }]
}

pub fn title(s: &str) -> PropertyValue {
    PropertyValue::Title(text(s))
}

pub fn relation_prop(id: &str, target: &str) -> SchemaProperty {
    SchemaProperty {
        id: id.to_string(),
        name: None,
        kind: "relation".into(),
        relation: Some(RelationConfig {
            database_id: Some(target.to_string()),
        }),
    }
}

pub fn schema(id: &str, props: Vec<(&str, SchemaProperty)>) -> CollectionSchema {
    CollectionSchema {
        id: id.to_string(),
        properties: props
            .into_iter()
            .map(|(name, mut prop)| {
                prop.name = Some(name.to_string());
                (name.to_string(), prop)
            })
            .collect(),
    }
}

#[tokio::test]
async fn mock_pages_by_offset_cursor() {
    let records = (0..5).map(|i| record(&format!("r{i}"), vec![])).collect();
    let store = MockStore::new()
        .with_collection("db", records)
        .with_page_size(2);

    let first = store.query("db", None).await.unwrap();
    assert_eq!(first.results.len(), 2);
    assert_eq!(first.next_cursor.as_deref(), Some("2"));

    let last = store.query("db", Some("4")).await.unwrap();
    assert_eq!(last.results.len(), 1);
    assert!(!last.has_more);
    assert!(last.next_cursor.is_none());
}

#[tokio::test]
async fn mock_failure_is_transport_error() {
    let store = MockStore::new().failing("db", 429);
    let err = store.query("db", None).await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, SyncError::Transport { status: 429, .. }));
}

#[tokio::test]
async fn set_relation_replaces_value_in_place() {
    let store = MockStore::new().with_collection("tasks", vec![record("t1", vec![])]);
    let key = RelationKey::Name("Bugs".into());

    store
        .set_relation("t1", &key, &["b1".to_string(), "b2".to_string()])
        .await
        .unwrap();
    store.set_relation("t1", &key, &["b3".to_string()]).await.unwrap();

    assert_eq!(store.relation_of("tasks", "t1", "Bugs"), vec!["b3"]);
    assert_eq!(store.writes.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn stores_are_usable_as_trait_objects() {
    let stores: Vec<Box<dyn RecordStore>> = vec![Box::new(MockStore::new())];
    assert_eq!(stores[0].name(), "Mock");
    let page = stores[0].query("unknown", None).await.unwrap();
    assert!(page.results.is_empty());
}
