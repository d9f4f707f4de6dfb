//! Search document construction from processed documents.

use serde::{Deserialize, Serialize};

use crate::content::ProcessedDocument;

/// Maximum indexed content length per document, in bytes.
///
/// Bounds the serialized search payload; content is cut at a word
/// boundary, never mid-word.
pub const MAX_CONTENT_LEN: usize = 5000;

/// Fallback section for documents whose path has no usable segment.
const DEFAULT_SECTION: &str = "docs";

/// One searchable document, the JSON shape shared with the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub path: String,
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub section: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<String>,
}

/// Map processed documents to search documents.
///
/// Order follows the input, which downstream tie-breaking relies on
/// being deterministic.
pub fn build_search_data(docs: &[ProcessedDocument]) -> Vec<SearchDocument> {
    docs.iter()
        .map(|doc| SearchDocument {
            id: doc.metadata.id.clone(),
            title: doc.metadata.title.clone(),
            content: truncate_at_whitespace(&doc.plain_text, MAX_CONTENT_LEN),
            path: doc.metadata.permalink.clone(),
            headings: doc.headings.iter().map(|h| h.text.clone()).collect(),
            tags: doc.metadata.tags.clone(),
            section: doc
                .metadata
                .section
                .clone()
                .unwrap_or_else(|| section_of(&doc.metadata.permalink)),
            anchors: doc.headings.iter().map(|h| h.id.clone()).collect(),
        })
        .collect()
}

/// First non-empty path segment, e.g. `/docs/guides/intro` -> `docs`.
fn section_of(path: &str) -> String {
    path.split('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_SECTION)
        .to_string()
}

/// Truncate to at most `max` bytes, cutting at the last whitespace at
/// or before the limit.
fn truncate_at_whitespace(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let head = &text[..end];
    match head.rfind(char::is_whitespace) {
        Some(idx) => head[..idx].trim_end().to_string(),
        None => head.to_string(),
    }
}
