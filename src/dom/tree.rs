//! Tree operations: insert, append, walk.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};
use crate::error::{Error, Result};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The component arena.
///
/// All nodes live in a single `SlotMap`; a parent owns its children through
/// the ordered child lists. Parent/child relationships are stored in
/// secondary maps so lookup is O(1). Stale [`NodeId`]s never resolve, which is
/// what lets the registry hold ids instead of references.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
}

impl Dom {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
        }
    }

    /// Insert a detached node.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Append `child` to `parent`'s ordered children.
    ///
    /// Fails with a configuration error when `parent` is a leaf kind, when a
    /// single-child container is already full, when `child` already has a
    /// parent, or when the append would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_kind = self.nodes.get(parent).ok_or(Error::UnknownNode)?.kind;
        if !self.nodes.contains_key(child) {
            return Err(Error::UnknownNode);
        }
        if !parent_kind.is_container() {
            return Err(Error::configuration(parent_kind, "cannot have children"));
        }
        if let Some(max) = parent_kind.max_children() {
            if self.children(parent).len() >= max {
                return Err(Error::configuration(
                    parent_kind,
                    format!("accepts at most {max} child"),
                ));
            }
        }
        if let Some(&existing) = self.parent.get(child) {
            let message = if existing == parent {
                "child is already attached to this container"
            } else {
                "child already has a parent"
            };
            return Err(Error::configuration(parent_kind, message));
        }
        if child == parent || self.ancestors(parent).contains(&child) {
            return Err(Error::configuration(
                parent_kind,
                "cannot contain one of its own ancestors",
            ));
        }

        self.parent.insert(child, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(child);
        }
        Ok(())
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no
    /// children or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the top, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Access a node that must exist.
    pub(crate) fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(id).ok_or(Error::UnknownNode)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(Error::UnknownNode)
    }

    /// Nodes without a parent, in insertion order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| !self.parent.contains_key(*id))
            .collect()
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the arena contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.children.clear();
        self.parent.clear();
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
