//! Path tree nodes
//!
//! Each node exclusively owns its children, so the tree has no back
//! pointers and is rebuilt identically by replaying the log.

use crate::directory::command::ResourceId;
use indexmap::IndexMap;

pub const PATH_SEPARATOR: char = '/';

/// Split a path into segments below the root.
///
/// A single leading separator names the root and trailing empty segments are
/// dropped, so `"/"`, `""` and `"/a/"` resolve to `[]`, `[]` and `["a"]`.
/// Interior empty segments are kept: `"/a//b"` walks `a`, `""`, `b`.
pub fn split_path(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix(PATH_SEPARATOR).unwrap_or(path);
    let mut segments: Vec<&str> = rest.split(PATH_SEPARATOR).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    version: u64,
    timestamp: u64,
    pub(crate) resource: Option<ResourceId>,
    pub(crate) children: IndexMap<String, Node>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, version: u64, timestamp: u64) -> Self {
        Self {
            name: name.into(),
            version,
            timestamp,
            resource: None,
            children: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Log index at creation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn resource(&self) -> Option<ResourceId> {
        self.resource
    }

    /// Child names in insertion order
    pub fn child_names(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Follow `segments` from this node.
    pub(crate) fn find(&self, segments: &[&str]) -> Option<&Node> {
        segments
            .iter()
            .try_fold(self, |node, name| node.children.get(*name))
    }

    pub(crate) fn find_mut(&mut self, segments: &[&str]) -> Option<&mut Node> {
        segments
            .iter()
            .try_fold(self, |node, name| node.children.get_mut(*name))
    }

    /// Follow `segments`, creating missing nodes. Returns the terminal node and
    /// whether anything was created.
    pub(crate) fn find_or_create(
        &mut self,
        segments: &[&str],
        version: u64,
        timestamp: u64,
    ) -> (&mut Node, bool) {
        let mut created = false;
        let mut node = self;
        for name in segments {
            node = node.children.entry((*name).to_string()).or_insert_with(|| {
                created = true;
                Node::new(*name, version, timestamp)
            });
        }
        (node, created)
    }

    /// Resource ids bound to this node or anywhere below it
    pub(crate) fn collect_resources(&self, out: &mut Vec<ResourceId>) {
        if let Some(id) = self.resource {
            out.push(id);
        }
        for child in self.children.values() {
            child.collect_resources(out);
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self.children.values().map(Node::subtree_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/"), Vec::<&str>::new());
        assert_eq!(split_path(""), Vec::<&str>::new());
        assert_eq!(split_path("/a/b/c"), ["a", "b", "c"]);
        assert_eq!(split_path("a/b"), ["a", "b"]);
        assert_eq!(split_path("/a/"), ["a"]);
        assert_eq!(split_path("/a//b"), ["a", "", "b"]);
    }

    #[test]
    fn test_find_or_create() {
        let mut root = Node::new("/", 1, 100);
        let (node, created) = root.find_or_create(&["a", "b"], 2, 200);
        assert!(created);
        assert_eq!(node.name(), "b");
        assert_eq!(node.version(), 2);

        let (_, created) = root.find_or_create(&["a", "b"], 3, 300);
        assert!(!created);
        assert_eq!(root.find(&["a"]).unwrap().version(), 2);
        assert_eq!(root.subtree_len(), 3);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut root = Node::new("/", 1, 0);
        for name in ["b", "a", "c"] {
            root.find_or_create(&[name], 2, 0);
        }
        assert_eq!(root.child_names(), ["b", "a", "c"]);
    }
}
