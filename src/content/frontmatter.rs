//! Frontmatter extraction: `---` (YAML-like) or `+++` (TOML) fences.

use std::path::Path;

use serde::Serialize;

use crate::error::ContentError;

/// A single frontmatter value.
///
/// Frontmatter is a closed set of scalar/list shapes rather than an
/// open JSON map; the metadata resolver validates against this type at
/// its boundary instead of poking at arbitrary dynamic values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Str(String),
    Num(f64),
    Bool(bool),
    List(Vec<String>),
}

impl FrontmatterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Parsed frontmatter: key/value pairs in source order.
///
/// Immutable after parse. Typed accessors return `None` on a missing
/// key or a type mismatch rather than erroring; the permissive posture
/// lets the resolver fall back to derived defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FrontmatterValue::as_str)
    }

    pub fn get_num(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FrontmatterValue::as_num)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FrontmatterValue::as_bool)
    }

    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(FrontmatterValue::as_list)
    }

    /// Iterate entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert a value, replacing an earlier entry with the same key.
    fn insert(&mut self, key: String, value: FrontmatterValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }
}

/// Result of splitting a raw file into metadata block and body.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub frontmatter: Frontmatter,
    pub body: String,
    /// The raw metadata block, fences excluded. Empty when absent.
    pub raw_block: String,
}

/// Split `raw` into a frontmatter block and body.
///
/// No fence at the top of the file yields empty frontmatter and the
/// full text as body. Malformed metadata fails with a `ContentError`
/// carrying `path` so the caller can skip that file only.
pub fn parse_frontmatter(raw: &str, path: &Path) -> Result<Extracted, ContentError> {
    for (fence, is_toml) in [("---", false), ("+++", true)] {
        let Some(rest) = strip_fence_line(raw, fence) else {
            continue;
        };
        let (block, body) = split_at_closing_fence(rest, fence).ok_or_else(|| {
            ContentError::Frontmatter {
                path: path.to_path_buf(),
                message: format!("unterminated `{fence}` fence"),
            }
        })?;
        let frontmatter = if is_toml {
            parse_toml_block(block, path)?
        } else {
            parse_yaml_like(block, path)?
        };
        return Ok(Extracted {
            frontmatter,
            body: body.to_string(),
            raw_block: block.to_string(),
        });
    }

    Ok(Extracted {
        frontmatter: Frontmatter::default(),
        body: raw.to_string(),
        raw_block: String::new(),
    })
}

/// Strip an opening fence line (`---\n` or `---\r\n`) from the start.
fn strip_fence_line<'a>(raw: &'a str, fence: &str) -> Option<&'a str> {
    let rest = raw.strip_prefix(fence)?;
    rest.strip_prefix('\n')
        .or_else(|| rest.strip_prefix("\r\n"))
}

/// Find the closing fence line; returns (block, body).
fn split_at_closing_fence<'a>(rest: &'a str, fence: &str) -> Option<(&'a str, &'a str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']).trim() == fence {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse simple YAML-like frontmatter (`key: value` lines).
///
/// Supports inline lists (`[a, b]`) and block lists:
///
/// ```text
/// tags:
///   - guides
///   - intro
/// ```
fn parse_yaml_like(block: &str, path: &Path) -> Result<Frontmatter, ContentError> {
    let mut fm = Frontmatter::default();
    let mut pending_list: Option<String> = None;

    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Block-list item for the preceding `key:` line.
        if let Some(item) = trimmed.strip_prefix("- ") {
            let Some(key) = &pending_list else {
                return Err(ContentError::Frontmatter {
                    path: path.to_path_buf(),
                    message: format!("list item without a key: `{trimmed}`"),
                });
            };
            if let Some(FrontmatterValue::List(items)) = fm
                .entries
                .iter_mut()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v)
            {
                items.push(unquote(item).to_string());
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            return Err(ContentError::Frontmatter {
                path: path.to_path_buf(),
                message: format!("expected `key: value`, got `{trimmed}`"),
            });
        };
        let key = key.trim().to_string();
        let value = value.trim();

        if value.is_empty() {
            // `key:` opens a block list; stays an empty list otherwise.
            fm.insert(key.clone(), FrontmatterValue::List(Vec::new()));
            pending_list = Some(key);
        } else {
            pending_list = None;
            fm.insert(key, parse_scalar(value));
        }
    }

    Ok(fm)
}

/// Parse a scalar value: bool, number, inline list or quoted string.
fn parse_scalar(value: &str) -> FrontmatterValue {
    if value.eq_ignore_ascii_case("true") {
        return FrontmatterValue::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return FrontmatterValue::Bool(false);
    }
    if let Ok(num) = value.parse::<f64>() {
        return FrontmatterValue::Num(num);
    }
    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|s| unquote(s.trim()).to_string())
            .filter(|s| !s.is_empty())
            .collect();
        return FrontmatterValue::List(items);
    }
    FrontmatterValue::Str(unquote(value).to_string())
}

/// Strip one matching pair of surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Parse a TOML frontmatter block via the `toml` crate.
fn parse_toml_block(block: &str, path: &Path) -> Result<Frontmatter, ContentError> {
    let table: toml::Table =
        toml::from_str(block).map_err(|e| ContentError::Frontmatter {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

    let mut fm = Frontmatter::default();
    for (key, value) in table {
        fm.insert(key, toml_to_value(value));
    }
    Ok(fm)
}

fn toml_to_value(value: toml::Value) -> FrontmatterValue {
    match value {
        toml::Value::String(s) => FrontmatterValue::Str(s),
        toml::Value::Integer(n) => FrontmatterValue::Num(n as f64),
        toml::Value::Float(n) => FrontmatterValue::Num(n),
        toml::Value::Boolean(b) => FrontmatterValue::Bool(b),
        toml::Value::Array(items) => FrontmatterValue::List(
            items
                .into_iter()
                .map(|v| match v {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        // Dates and tables degrade to their string form.
        other => FrontmatterValue::Str(other.to_string()),
    }
}
