use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A page from either the task or the bug-tracker database.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, Property>,
}

impl Record {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }
}

/// One property instance on a page.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawProperty")]
pub struct Property {
    pub id: Option<String>,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Select(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    RichText(Vec<RichText>),
    Title(Vec<RichText>),
    Status(Option<SelectOption>),
    Relation {
        refs: Vec<RelationRef>,
        /// Only present when the API echoes the relation configuration on the page.
        target_database: Option<String>,
    },
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RelationPayload {
    Refs(Vec<RelationRef>),
    Config {
        #[serde(default)]
        database_id: Option<String>,
    },
}

// Notion encodes a property as {"id", "type": kind, kind: payload}.
#[derive(Deserialize)]
struct RawProperty {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    select: Option<SelectOption>,
    #[serde(default)]
    multi_select: Option<Vec<SelectOption>>,
    #[serde(default)]
    rich_text: Option<Vec<RichText>>,
    #[serde(default)]
    title: Option<Vec<RichText>>,
    #[serde(default)]
    status: Option<SelectOption>,
    #[serde(default)]
    relation: Option<RelationPayload>,
}

impl From<RawProperty> for Property {
    fn from(raw: RawProperty) -> Self {
        let value = match raw.kind.as_str() {
            "select" => PropertyValue::Select(raw.select),
            "multi_select" => PropertyValue::MultiSelect(raw.multi_select.unwrap_or_default()),
            "rich_text" => PropertyValue::RichText(raw.rich_text.unwrap_or_default()),
            "title" => PropertyValue::Title(raw.title.unwrap_or_default()),
            "status" => PropertyValue::Status(raw.status),
            "relation" => match raw.relation {
                Some(RelationPayload::Refs(refs)) => PropertyValue::Relation {
                    refs,
                    target_database: None,
                },
                Some(RelationPayload::Config { database_id }) => PropertyValue::Relation {
                    refs: Vec::new(),
                    target_database: database_id,
                },
                None => PropertyValue::Relation {
                    refs: Vec::new(),
                    target_database: None,
                },
            },
            other => PropertyValue::Unsupported(other.to_string()),
        };
        Property { id: raw.id, value }
    }
}

/// One page of a database query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Record>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
