use std::collections::BTreeSet;

use tracing::debug;

use crate::model::record::{PropertyValue, Record, SelectOption};
use crate::util::text::plain_text;

pub const UNTITLED: &str = "(untitled)";

fn option_name(option: Option<&SelectOption>) -> BTreeSet<String> {
    option
        .map(|o| o.name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| BTreeSet::from([name.to_string()]))
        .unwrap_or_default()
}

/// Read the version values of `property` as a set of trimmed, non-empty strings.
///
/// An absent property or an unsupported kind yields the empty set.
pub fn extract_versions(record: &Record, property: &str) -> BTreeSet<String> {
    let Some(prop) = record.property(property) else {
        return BTreeSet::new();
    };

    match &prop.value {
        PropertyValue::Select(option) | PropertyValue::Status(option) => {
            option_name(option.as_ref())
        }
        PropertyValue::MultiSelect(options) => options
            .iter()
            .map(|o| o.name.trim())
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect(),
        PropertyValue::RichText(fragments) | PropertyValue::Title(fragments) => {
            let joined = plain_text(fragments);
            let trimmed = joined.trim();
            if trimmed.is_empty() {
                BTreeSet::new()
            } else {
                BTreeSet::from([trimmed.to_string()])
            }
        }
        PropertyValue::Relation { .. } => BTreeSet::new(),
        PropertyValue::Unsupported(kind) => {
            debug!(record = %record.id, property, %kind, "unsupported property kind for versions");
            BTreeSet::new()
        }
    }
}

/// The page title, or `(untitled)`.
pub fn extract_title(record: &Record) -> String {
    record
        .properties
        .values()
        .find_map(|p| match &p.value {
            PropertyValue::Title(fragments) => Some(plain_text(fragments)),
            _ => None,
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}
