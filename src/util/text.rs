use crate::model::record::RichText;

/// Concatenate the plain text of every rich-text fragment.
pub fn plain_text(fragments: &[RichText]) -> String {
    fragments.iter().map(|f| f.plain_text.as_str()).collect()
}

/// Notion ids show up both dashed and undashed, in either case.
pub fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
