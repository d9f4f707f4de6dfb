//! Excerpt and highlight-range generation for search results.

use serde::Serialize;

use super::document::SearchDocument;

/// Width of a content excerpt window, in characters.
pub const EXCERPT_WINDOW: usize = 150;

/// Which document field an excerpt was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcerptField {
    Title,
    Content,
}

/// A fragment of a matching field with highlight ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Excerpt {
    pub field: ExcerptField,
    pub text: String,
    /// Half-open `(start, end)` character ranges into `text`.
    pub highlights: Vec<(usize, usize)>,
}

/// Build excerpts for one document against the query tokens.
///
/// The title excerpt is included only when some query token occurs in
/// the title (case-insensitive substring); the content excerpt picks
/// the window covering the most distinct query tokens.
pub fn build_excerpts(doc: &SearchDocument, tokens: &[String]) -> Vec<Excerpt> {
    let mut excerpts = Vec::new();

    let title_lower = doc.title.to_lowercase();
    if tokens.iter().any(|t| title_lower.contains(t.as_str())) {
        excerpts.push(Excerpt {
            field: ExcerptField::Title,
            text: doc.title.clone(),
            highlights: highlight_ranges(&doc.title, tokens),
        });
    }

    if let Some(excerpt) = content_excerpt(&doc.content, tokens) {
        excerpts.push(excerpt);
    }

    excerpts
}

/// Find every occurrence of every token (case-insensitive) and merge
/// overlapping or adjacent ranges. Offsets are character positions.
pub fn highlight_ranges(text: &str, tokens: &[String]) -> Vec<(usize, usize)> {
    let haystack = lowered_chars(text);
    let mut ranges = Vec::new();

    for token in tokens {
        let needle: Vec<char> = token.chars().collect();
        for start in find_all(&haystack, &needle) {
            ranges.push((start, start + needle.len()));
        }
    }

    merge_ranges(ranges)
}

/// Pick the best content window and highlight it.
fn content_excerpt(content: &str, tokens: &[String]) -> Option<Excerpt> {
    let chars: Vec<char> = content.chars().collect();
    let haystack = lowered_chars(content);

    // All occurrences of any token, as window anchor candidates.
    let mut occurrences = Vec::new();
    for token in tokens {
        let needle: Vec<char> = token.chars().collect();
        occurrences.extend(find_all(&haystack, &needle));
    }
    if occurrences.is_empty() {
        return None;
    }
    occurrences.sort_unstable();

    // Best window: the one containing the most distinct query tokens.
    let mut best_start = 0;
    let mut best_count = 0;
    for &anchor in &occurrences {
        let start = anchor.saturating_sub(EXCERPT_WINDOW / 3);
        let end = (start + EXCERPT_WINDOW).min(chars.len());
        let count = distinct_tokens_in(&haystack[start..end], tokens);
        if count > best_count {
            best_count = count;
            best_start = start;
        }
    }

    let end = (best_start + EXCERPT_WINDOW).min(chars.len());
    let mut text = String::new();
    if best_start > 0 {
        text.push('…');
    }
    text.extend(&chars[best_start..end]);
    if end < chars.len() {
        text.push('…');
    }

    Some(Excerpt {
        field: ExcerptField::Content,
        highlights: highlight_ranges(&text, tokens),
        text,
    })
}

/// Count distinct query tokens occurring inside a window.
fn distinct_tokens_in(window: &[char], tokens: &[String]) -> usize {
    tokens
        .iter()
        .filter(|token| {
            let needle: Vec<char> = token.chars().collect();
            !find_all(window, &needle).is_empty()
        })
        .count()
}

/// Per-char lowercasing keeps a 1:1 mapping to the original text.
fn lowered_chars(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// All start offsets of `needle` in `haystack`.
fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len())
        .filter(|&i| &haystack[i..i + needle.len()] == needle)
        .collect()
}

/// Merge overlapping/adjacent ranges, sorted by start.
fn merge_ranges(mut ranges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
