use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Database schema as returned by `GET /databases/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSchema {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaProperty {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub relation: Option<RelationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationConfig {
    #[serde(default)]
    pub database_id: Option<String>,
}

impl SchemaProperty {
    /// Target database of a relation property; None for every other kind.
    pub fn relation_target(&self) -> Option<&str> {
        if self.kind != "relation" {
            return None;
        }
        self.relation.as_ref()?.database_id.as_deref()
    }
}

/// How the relation property is addressed in an update request.
///
/// Notion accepts either the stable property id or the display name as the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum RelationKey {
    Id(String),
    Name(String),
}

impl RelationKey {
    pub fn as_str(&self) -> &str {
        match self {
            RelationKey::Id(s) | RelationKey::Name(s) => s,
        }
    }
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKey::Id(id) => write!(f, "id:{id}"),
            RelationKey::Name(name) => write!(f, "name:{name}"),
        }
    }
}
