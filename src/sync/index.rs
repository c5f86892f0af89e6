use std::collections::HashMap;

use crate::model::record::Record;
use crate::sync::extract::extract_versions;

/// Version string to bug-tracker page ids, in scan order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VersionIndex {
    buckets: HashMap<String, Vec<String>>,
}

impl VersionIndex {
    pub fn build(records: &[Record], version_property: &str) -> Self {
        let mut buckets: HashMap<String, Vec<String>> = HashMap::new();
        for record in records {
            for version in extract_versions(record, version_property) {
                buckets.entry(version).or_default().push(record.id.clone());
            }
        }
        Self { buckets }
    }

    pub fn lookup(&self, version: &str) -> &[String] {
        self.buckets.get(version).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct versions.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Concatenate the buckets of every version, in the given version order.
    pub fn matches<'a, I>(&self, versions: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        versions
            .into_iter()
            .flat_map(|v| self.lookup(v).iter().cloned())
            .collect()
    }
}
