//! Markdown text helpers: heading extraction and plain-text stripping.
//!
//! These are line/regex based on purpose - the engine never renders
//! markdown, it only needs anchors and searchable text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A heading extracted from a document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Stable anchor id, derived from the text via [`slugify`].
    pub id: String,
    /// Heading text with inline markup stripped.
    pub text: String,
    /// Heading level (1-6).
    pub level: u8,
}

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]*)`").unwrap());
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{1,3}|~~|__").unwrap());

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_]+").unwrap());

/// Derive a stable anchor id from heading text.
///
/// Lowercase, non-word characters stripped, whitespace/underscore runs
/// collapsed to single hyphens, leading/trailing hyphens trimmed.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, "");
    let hyphenated = SEPARATOR_RUN.replace_all(cleaned.trim(), "-");
    hyphenated.trim_matches('-').to_string()
}

/// Extract ATX headings (`#` through `######`) from a markdown body.
///
/// Heading text has inline emphasis/code/link markup stripped; the
/// anchor id comes from [`slugify`]. Headings inside fenced code blocks
/// are ignored.
pub fn extract_headings(body: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut in_fence = false;

    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let Some(caps) = ATX_HEADING.captures(line) else {
            continue;
        };
        let level = caps[1].len() as u8;
        let text = strip_inline(trim_closing_hashes(&caps[2]));
        if text.is_empty() {
            continue;
        }
        headings.push(Heading {
            id: slugify(&text),
            text,
            level,
        });
    }

    headings
}

/// Trim an optional closing ATX hash run (`## Title ##`).
fn trim_closing_hashes(text: &str) -> &str {
    let trimmed = text.trim_end();
    let without = trimmed.trim_end_matches('#');
    if without.len() < trimmed.len() && without.ends_with(' ') {
        without.trim_end()
    } else {
        trimmed
    }
}

/// Strip inline emphasis, code and link markup, keeping visible text.
fn strip_inline(text: &str) -> String {
    let text = INLINE_CODE.replace_all(text, "$1");
    let text = IMAGE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = EMPHASIS.replace_all(&text, "");
    text.trim().to_string()
}

static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(```|~~~).*?(```|~~~)").unwrap());
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>\n]+>").unwrap());
static MODULE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:import|export)\s.*$").unwrap());
static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
static BLOCKQUOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*>\s?").unwrap());
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").unwrap());
static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {0,3}(?:-{3,}|\*{3,}|_{3,})\s*$").unwrap());
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Reduce a markdown body to plain text for search indexing.
///
/// Removes code (fenced and inline), HTML tags, images, link syntax
/// (keeping the link text), emphasis markers, heading/list/blockquote/
/// rule markers and `import`/`export` lines; runs of three or more
/// newlines collapse to a single blank line.
pub fn strip_markdown(body: &str) -> String {
    let text = MODULE_LINE.replace_all(body, "");
    let text = FENCED_CODE.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = HTML_TAG.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = HORIZONTAL_RULE.replace_all(&text, "");
    let text = HEADING_MARKER.replace_all(&text, "");
    let text = BLOCKQUOTE_MARKER.replace_all(&text, "");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Getting Started!"), "getting-started");
        assert_eq!(slugify("snake_case_name"), "snake-case-name");
        assert_eq!(slugify("  spaced  out  "), "spaced-out");
        assert_eq!(slugify("--edges--"), "edges");
    }

    #[test]
    fn test_extract_headings_basic() {
        let body = "# Title\n\nsome text\n\n## Section One\n\n### Deep\n";
        let headings = extract_headings(body);
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[0], Heading {
            id: "title".to_string(),
            text: "Title".to_string(),
            level: 1,
        });
        assert_eq!(headings[1].id, "section-one");
        assert_eq!(headings[2].level, 3);
    }

    #[test]
    fn test_extract_headings_strips_inline_markup() {
        let headings = extract_headings("## Using `config.toml` with **care**\n");
        assert_eq!(headings[0].text, "Using config.toml with care");
        assert_eq!(headings[0].id, "using-configtoml-with-care");
    }

    #[test]
    fn test_extract_headings_link_text_kept() {
        let headings = extract_headings("## See [the guide](/docs/guide)\n");
        assert_eq!(headings[0].text, "See the guide");
    }

    #[test]
    fn test_extract_headings_skips_code_fences() {
        let body = "# Real\n\n```sh\n# not a heading\n```\n\n## Also Real\n";
        let headings = extract_headings(body);
        let texts: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Real", "Also Real"]);
    }

    #[test]
    fn test_extract_headings_closing_hashes() {
        let headings = extract_headings("## Closed ##\n");
        assert_eq!(headings[0].text, "Closed");
    }

    #[test]
    fn test_strip_markdown_code_and_links() {
        let body = "Intro with `inline` code.\n\n```rust\nfn hidden() {}\n```\n\nA [link](/to/page) and ![img](pic.png).";
        let plain = strip_markdown(body);
        assert!(!plain.contains("inline"));
        assert!(!plain.contains("hidden"));
        assert!(plain.contains("A link and"));
        assert!(!plain.contains("pic.png"));
    }

    #[test]
    fn test_strip_markdown_markers() {
        let body = "# Heading\n\n> quoted\n\n- item one\n1. item two\n\n---\n\n**bold** text";
        let plain = strip_markdown(body);
        assert!(plain.contains("Heading"));
        assert!(plain.contains("quoted"));
        assert!(plain.contains("item one"));
        assert!(plain.contains("item two"));
        assert!(plain.contains("bold text"));
        assert!(!plain.contains('#'));
        assert!(!plain.contains('>'));
        assert!(!plain.contains("**"));
        assert!(!plain.contains("---"));
    }

    #[test]
    fn test_strip_markdown_import_export_lines() {
        let body = "import Tabs from '@theme/Tabs';\n\nexport const x = 1;\n\nReal prose.";
        let plain = strip_markdown(body);
        assert!(!plain.contains("import"));
        assert!(!plain.contains("export"));
        assert!(plain.contains("Real prose."));
    }

    #[test]
    fn test_strip_markdown_collapses_blank_runs() {
        let plain = strip_markdown("one\n\n\n\n\ntwo");
        assert_eq!(plain, "one\n\ntwo");
    }

    #[test]
    fn test_strip_markdown_html_tags() {
        let plain = strip_markdown("before <div class=\"x\">inside</div> after");
        assert_eq!(plain, "before inside after");
    }
}
