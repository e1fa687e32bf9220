//! A prefix tree over dotted tree numbers.
//!
//! The [`Node`] knows nothing about records. It only answers structural
//! questions about the tree-number vocabulary, chiefly "which tree numbers sit
//! below this one".

use std::collections::{BTreeMap, btree_map::Entry};

use tracing::instrument;

/// Separator between the segments of a tree number (`C01.100.200`).
pub const PATH_SEPARATOR: char = '.';

/// A node of the tree-number prefix tree.
///
/// The tree is append-only: nodes are created by [`Node::insert`] and never
/// removed or relabelled. The root node has no segment of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    children: BTreeMap<String, Self>,
}

impl Node {
    /// Creates an empty root node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a path given as a sequence of segments, creating any missing
    /// nodes along the way.
    ///
    /// Existing nodes are followed, never replaced, so inserting a path that
    /// is already present is a no-op.
    ///
    /// Returns `true` if at least one node was created.
    pub fn insert<I, S>(&mut self, segments: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut node = self;
        let mut created = false;

        for segment in segments {
            let entry = node.children.entry(segment.as_ref().to_owned());
            created |= matches!(entry, Entry::Vacant(_));
            node = entry.or_default();
        }

        created
    }

    /// Inserts a dotted path such as `C01.100.200`.
    ///
    /// Returns `true` if at least one node was created.
    pub fn insert_path(&mut self, path: &str) -> bool {
        self.insert(path.split(PATH_SEPARATOR))
    }

    /// The direct children of this node, keyed by segment.
    #[must_use]
    pub const fn children(&self) -> &BTreeMap<String, Self> {
        &self.children
    }

    /// Looks up a direct child by segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&Self> {
        self.children.get(segment)
    }

    /// Returns `true` if this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Walks a dotted path from this node.
    ///
    /// Returns `None` as soon as a segment is missing.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Self> {
        path.split(PATH_SEPARATOR)
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Returns `true` if the dotted path exists below this node.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Lists every tree number below `prefix`.
    ///
    /// All descendants are returned, not only leaves, each as a full dotted
    /// path from the root. The prefix itself is not part of the result. An
    /// unknown prefix yields an empty list; use [`Node::find`] to tell an
    /// unknown prefix apart from one without descendants.
    ///
    /// Callers should not rely on the order of the result.
    #[must_use]
    #[instrument(level = "trace", skip(self))]
    pub fn same_prefix(&self, prefix: &str) -> Vec<String> {
        let Some(node) = self.find(prefix) else {
            return Vec::new();
        };

        let mut paths = Vec::new();
        node.collect_descendants(prefix, &mut paths);
        paths
    }

    /// Lists every path in the tree below this node.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (segment, child) in &self.children {
            paths.push(segment.clone());
            child.collect_descendants(segment, &mut paths);
        }
        paths
    }

    /// The number of nodes below this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.node_count())
            .sum()
    }

    fn collect_descendants(&self, path: &str, out: &mut Vec<String>) {
        for (segment, child) in &self.children {
            let child_path = format!("{path}{PATH_SEPARATOR}{segment}");
            child.collect_descendants(&child_path, out);
            out.push(child_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn tree(paths: &[&str]) -> Node {
        let mut root = Node::new();
        for path in paths {
            root.insert_path(path);
        }
        root
    }

    fn as_set(paths: Vec<String>) -> BTreeSet<String> {
        paths.into_iter().collect()
    }

    #[test]
    fn same_prefix_returns_all_descendants() {
        let root = tree(&["C01.100", "C01.100.200", "C02"]);

        let result = as_set(root.same_prefix("C01"));

        let expected: BTreeSet<String> = ["C01.100", "C01.100.200"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn same_prefix_includes_interior_nodes() {
        let root = tree(&["A01.001.002.003", "A01.004"]);

        let result = as_set(root.same_prefix("A01"));

        assert_eq!(result.len(), 4);
        assert!(result.contains("A01.001"));
        assert!(result.contains("A01.001.002"));
        assert!(result.contains("A01.001.002.003"));
        assert!(result.contains("A01.004"));
    }

    #[test]
    fn same_prefix_with_deep_prefix() {
        let root = tree(&["C01.100.200.300", "C01.100.201", "C01.101"]);

        let result = as_set(root.same_prefix("C01.100"));

        assert_eq!(result.len(), 3);
        assert!(result.contains("C01.100.200"));
        assert!(result.contains("C01.100.200.300"));
        assert!(result.contains("C01.100.201"));
    }

    #[test]
    fn absent_prefix_is_empty() {
        let root = tree(&["C01.100", "C02"]);

        assert!(root.same_prefix("D01").is_empty());
        assert!(root.same_prefix("C01.999").is_empty());
        assert!(root.same_prefix("").is_empty());
        assert!(root.find("D01").is_none());
    }

    #[test]
    fn leaf_prefix_is_found_but_empty() {
        let root = tree(&["C01.100", "C02"]);

        assert!(root.same_prefix("C02").is_empty());
        assert!(root.find("C02").is_some_and(Node::is_leaf));
    }

    #[test]
    fn insert_is_idempotent() {
        let mut root = tree(&["C01.100", "C01.100.200", "C02"]);
        let before = root.clone();
        let query_before = as_set(root.same_prefix("C01"));

        assert!(!root.insert_path("C01.100.200"));
        assert!(!root.insert_path("C01"));

        assert_eq!(root, before);
        assert_eq!(as_set(root.same_prefix("C01")), query_before);
    }

    #[test]
    fn insert_reports_new_nodes() {
        let mut root = Node::new();

        assert!(root.insert(["C01", "100"]));
        assert!(root.insert(["C01", "100", "200"]));
        assert!(!root.insert(["C01", "100"]));
        assert_eq!(root.node_count(), 3);
    }

    #[test]
    fn results_walk_back_to_existing_nodes() {
        let root = tree(&[
            "C01.100",
            "C01.100.200",
            "C01.100.200.050",
            "C01.150",
            "C02.800",
        ]);

        for path in root.same_prefix("C01") {
            let segments: Vec<_> = path.split(PATH_SEPARATOR).collect();
            let node = segments
                .iter()
                .try_fold(&root, |node, segment| node.child(segment));
            assert!(node.is_some(), "{path} does not resolve");
        }
    }

    #[test]
    fn children_lookup() {
        let root = tree(&["C01.100", "C01.200", "C02"]);

        let top: Vec<_> = root.children().keys().map(String::as_str).collect();
        assert_eq!(top, ["C01", "C02"]);

        let c01 = root.child("C01").unwrap();
        assert_eq!(c01.children().len(), 2);
        assert!(c01.child("100").is_some());
        assert!(root.child("100").is_none());
    }

    #[test]
    fn paths_lists_whole_tree() {
        let root = tree(&["C01.100", "C02"]);

        let paths = as_set(root.paths());

        assert_eq!(paths.len(), 3);
        assert!(paths.contains("C01"));
        assert!(paths.contains("C01.100"));
        assert!(paths.contains("C02"));
        assert_eq!(root.node_count(), 3);
    }
}
