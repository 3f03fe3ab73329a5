//! Id registry: string id -> node lookup for cross-tree references.
//!
//! Entries hold arena keys, not references. A key whose node no longer exists
//! simply stops resolving, so a miss is always `None` and never an error.

use std::collections::HashMap;

use super::node::NodeId;
use super::tree::Dom;

/// Maps component ids to nodes.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: HashMap<String, NodeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `id`, returning the node previously registered
    /// under that id, if any.
    pub fn register(&mut self, id: &str, node: NodeId) -> Option<NodeId> {
        self.entries.insert(id.to_owned(), node)
    }

    /// Remove `id`.
    pub fn unregister(&mut self, id: &str) -> Option<NodeId> {
        self.entries.remove(id)
    }

    /// The raw entry for `id`, without checking it is still alive.
    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.entries.get(id).copied()
    }

    /// The node registered under `id`, if it still exists in `dom`.
    pub fn resolve(&self, id: &str, dom: &Dom) -> Option<NodeId> {
        self.get(id).filter(|node| dom.contains(*node))
    }

    /// Drop entries whose node no longer exists. Returns how many were
    /// removed.
    pub fn prune(&mut self, dom: &Dom) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, node| dom.contains(*node));
        before - self.entries.len()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::kind::Kind;
    use crate::dom::node::NodeData;

    #[test]
    fn register_and_get() {
        let mut dom = Dom::new();
        let node = dom.insert(NodeData::new(Kind::Button));
        let mut registry = Registry::new();
        assert_eq!(registry.register("ok", node), None);
        assert_eq!(registry.get("ok"), Some(node));
        assert_eq!(registry.resolve("ok", &dom), Some(node));
    }

    #[test]
    fn miss_is_none() {
        let registry = Registry::new();
        assert_eq!(registry.get("nonexistent"), None);
        assert_eq!(registry.resolve("nonexistent", &Dom::new()), None);
    }

    #[test]
    fn reregister_replaces_silently() {
        let mut dom = Dom::new();
        let first = dom.insert(NodeData::new(Kind::Label));
        let second = dom.insert(NodeData::new(Kind::Label));
        let mut registry = Registry::new();
        registry.register("title", first);
        assert_eq!(registry.register("title", second), Some(first));
        assert_eq!(registry.get("title"), Some(second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn stale_entries_do_not_resolve() {
        let mut dom = Dom::new();
        let node = dom.insert(NodeData::new(Kind::Entry));
        let mut registry = Registry::new();
        registry.register("name", node);
        dom.clear();
        assert_eq!(registry.resolve("name", &dom), None);
        assert_eq!(registry.prune(&dom), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_sorted() {
        let mut dom = Dom::new();
        let mut registry = Registry::new();
        for id in ["zeta", "alpha", "mid"] {
            let node = dom.insert(NodeData::new(Kind::Label));
            registry.register(id, node);
        }
        assert_eq!(registry.ids(), vec!["alpha", "mid", "zeta"]);
        assert!(registry.unregister("mid").is_some());
        registry.clear();
        assert!(registry.is_empty());
    }
}
