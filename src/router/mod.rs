//! Radix-tree route matching: static, `:param` and `**` segments.
//!
//! Matching priority at every node is structural, not insertion-order
//! based: an exact static child always wins over a parameter child,
//! which wins over a catch-all. A failed deeper match backtracks,
//! restoring any parameter binding it displaced.

mod node;

use percent_encoding::percent_decode_str;
use rustc_hash::FxHashMap;

use node::RadixNode;

/// Captured parameters, keyed by name (`*` for catch-all remainders).
pub type RouteParams = FxHashMap<String, String>;

/// A successful route match.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a, T> {
    pub data: &'a T,
    pub params: RouteParams,
    /// The path as queried.
    pub path: String,
}

/// Route table over opaque per-route data.
///
/// One instance owns its whole tree; construct one per project root
/// and pass it through the call chain.
#[derive(Debug)]
pub struct RouteMatcher<T> {
    root: RadixNode<T>,
}

impl<T> Default for RouteMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteMatcher<T> {
    pub fn new() -> Self {
        Self {
            root: RadixNode::new(""),
        }
    }

    /// Register `data` under a path pattern.
    ///
    /// Patterns use `/static/segments`, `/:param` and `/**` (or `/*`)
    /// conventions; the empty path registers the root. Registering a
    /// pattern twice overwrites the data and logs a non-fatal
    /// duplicate-route warning. A second `:name` at a node where a
    /// parameter already exists keeps the original name.
    pub fn insert(&mut self, path: &str, data: T) {
        let mut node = &mut self.root;

        for segment in split_segments(path) {
            if let Some(name) = segment.strip_prefix(':') {
                if node.param_child.is_none() {
                    node.param_name = Some(name.to_string());
                }
                node = node
                    .param_child
                    .get_or_insert_with(|| Box::new(RadixNode::new(segment)));
            } else if segment == "*" || segment == "**" {
                node = node
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(RadixNode::new(segment)));
            } else {
                node = node
                    .children
                    .entry(segment.to_string())
                    .or_insert_with(|| RadixNode::new(segment));
            }
        }

        if node.data.is_some() {
            crate::log!("warning"; "duplicate route registration for `{path}`, overwriting");
        }
        node.data = Some(data);
    }

    /// Resolve an incoming path to registered data plus parameters.
    pub fn matches(&self, path: &str) -> Option<RouteMatch<'_, T>> {
        let segments = split_segments(path);
        let mut params = RouteParams::default();
        let data = match_node(&self.root, &segments, &mut params)?;
        Some(RouteMatch {
            data,
            params,
            path: path.to_string(),
        })
    }

    /// Whether `path` resolves to any registered route.
    pub fn has(&self, path: &str) -> bool {
        self.matches(path).is_some()
    }

    /// Clear terminal data at a pattern's node, keeping the node.
    ///
    /// Takes the registration notation (`/docs/:slug`), not a concrete
    /// path. Returns whether a removal occurred.
    pub fn remove(&mut self, path: &str) -> bool {
        let mut node = &mut self.root;
        for segment in split_segments(path) {
            let next = if segment.starts_with(':') {
                node.param_child.as_deref_mut()
            } else if segment == "*" || segment == "**" {
                node.wildcard_child.as_deref_mut()
            } else {
                node.children.get_mut(segment)
            };
            match next {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.data.take().is_some()
    }

    /// All registered `(pattern, data)` pairs, reconstructed from the
    /// tree (parameter children as `:name`, wildcards as `**`).
    pub fn all_routes(&self) -> Vec<(String, &T)> {
        let mut routes = Vec::new();
        collect_routes(&self.root, String::new(), &mut routes);
        routes
    }
}

/// Depth-first match with per-node priority: static, param, catch-all.
fn match_node<'a, T>(
    node: &'a RadixNode<T>,
    segments: &[&str],
    params: &mut RouteParams,
) -> Option<&'a T> {
    let Some((&head, rest)) = segments.split_first() else {
        return node.data.as_ref();
    };

    if let Some(child) = node.children.get(head) {
        if let Some(data) = match_node(child, rest, params) {
            return Some(data);
        }
    }

    if let (Some(child), Some(name)) = (&node.param_child, &node.param_name) {
        let previous = params.insert(name.clone(), decode_segment(head));
        if let Some(data) = match_node(child, rest, params) {
            return Some(data);
        }
        // Backtrack: restore whatever occupied the key before.
        match previous {
            Some(value) => {
                params.insert(name.clone(), value);
            }
            None => {
                params.remove(name);
            }
        }
    }

    if let Some(child) = &node.wildcard_child {
        // A catch-all only matches when it is itself a terminal route,
        // and it swallows everything that remains.
        if let Some(data) = child.data.as_ref() {
            let remainder = segments
                .iter()
                .map(|s| decode_segment(s))
                .collect::<Vec<_>>()
                .join("/");
            params.insert("*".to_string(), remainder);
            return Some(data);
        }
    }

    None
}

fn collect_routes<'a, T>(
    node: &'a RadixNode<T>,
    prefix: String,
    routes: &mut Vec<(String, &'a T)>,
) {
    if let Some(data) = &node.data {
        let path = if prefix.is_empty() { "/".to_string() } else { prefix.clone() };
        routes.push((path, data));
    }
    for child in node.children.values() {
        collect_routes(child, format!("{prefix}/{}", child.segment), routes);
    }
    if let (Some(child), Some(name)) = (&node.param_child, &node.param_name) {
        collect_routes(child, format!("{prefix}/:{name}"), routes);
    }
    if let Some(child) = &node.wildcard_child {
        collect_routes(child, format!("{prefix}/**"), routes);
    }
}

/// Split on `/` after trimming; the empty path has zero segments.
fn split_segments(path: &str) -> Vec<&str> {
    path.trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Percent-decode a raw path segment, falling back to the raw bytes.
fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
