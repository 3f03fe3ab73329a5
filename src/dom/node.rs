//! Node types: NodeId, NodeData, Binding.

use slotmap::new_key_type;

use super::config::Config;
use super::kind::Kind;
use crate::event::HandlerTable;
use crate::state::{Path, WatchId};
use crate::toolkit::{Handle, HandleSlot};

new_key_type! {
    /// Unique identifier for a component node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Direction of a store binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BindingMode {
    /// Store changes reach the control and control changes reach the store.
    #[default]
    TwoWay,
    /// Store changes reach the control only.
    OneWay,
}

/// A node's binding to a store path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub path: Path,
    pub mode: BindingMode,
    /// The store watcher pushing values into the control.
    pub watch: WatchId,
}

/// Data associated with a single component node.
#[derive(Debug)]
pub struct NodeData {
    pub kind: Kind,
    /// Optional registry id.
    pub id: Option<String>,
    pub config: Config,
    pub binding: Option<Binding>,
    pub handlers: HandlerTable,
    pub(crate) handle: HandleSlot,
    /// Widget created by a realize call that has not finished attaching
    /// children. Published to `handle` once the subtree is complete.
    pub(crate) pending: Option<Handle>,
    /// Children already attached inside this node's widget.
    pub(crate) attached: Vec<NodeId>,
}

impl NodeData {
    /// A node of `kind` with default configuration.
    pub fn new(kind: Kind) -> Self {
        Self::with_config(Config::defaults(kind))
    }

    /// A node whose kind is taken from `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            kind: config.kind(),
            id: None,
            config,
            binding: None,
            handlers: HandlerTable::new(),
            handle: HandleSlot::default(),
            pending: None,
            attached: Vec::new(),
        }
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The native handle, once realized.
    pub fn handle(&self) -> Option<Handle> {
        self.handle.get()
    }

    pub fn is_realized(&self) -> bool {
        self.handle.get().is_some()
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}
