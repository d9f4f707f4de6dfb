//! Radix tree nodes: one path segment per node.

use rustc_hash::FxHashMap;

/// One node in the route tree.
///
/// Nodes are exclusively owned by their parent. A node has any number
/// of static children, at most one named-parameter child and at most
/// one wildcard child.
#[derive(Debug)]
pub(super) struct RadixNode<T> {
    /// The segment this node was registered under. Matching goes
    /// through the parent's child maps; this is used to reconstruct
    /// patterns for route listing.
    pub(super) segment: String,
    /// Static children keyed by exact literal.
    pub(super) children: FxHashMap<String, RadixNode<T>>,
    /// Name bound by the parameter child, set when it is created and
    /// never overwritten by later registrations.
    pub(super) param_name: Option<String>,
    pub(super) param_child: Option<Box<RadixNode<T>>>,
    /// Catch-all child (`*` / `**`); consumes all remaining segments.
    pub(super) wildcard_child: Option<Box<RadixNode<T>>>,
    /// Terminal payload; `Some` marks this node as a registered route.
    pub(super) data: Option<T>,
}

impl<T> RadixNode<T> {
    pub(super) fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            children: FxHashMap::default(),
            param_name: None,
            param_child: None,
            wildcard_child: None,
            data: None,
        }
    }
}
