//! Component arena: slotmap-backed node tree, typed configuration, id registry.

pub mod config;
pub mod kind;
pub mod node;
pub mod registry;
pub mod tree;

pub use config::{Common, Config, Orientation, Props};
pub use kind::{Kind, ValueKind};
pub use node::{Binding, BindingMode, NodeData, NodeId};
pub use registry::Registry;
pub use tree::Dom;
