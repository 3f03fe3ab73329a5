//! Event kinds and the event payload delivered to handlers.

use std::fmt;

use serde_json::Value;

use crate::dom::node::NodeId;

/// Named event kinds a control can emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The control's value changed. The only kind the binding glue treats as
    /// value-affecting.
    Change,
    Click,
    Select,
    Toggle,
    Activate,
    /// An application- or toolkit-specific event name.
    Custom(String),
}

impl EventKind {
    /// Parse a kind from its name. Unknown names become [`EventKind::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "change" | "changed" => EventKind::Change,
            "click" | "clicked" => EventKind::Click,
            "select" => EventKind::Select,
            "toggle" | "toggled" => EventKind::Toggle,
            "activate" => EventKind::Activate,
            other => EventKind::Custom(other.to_owned()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EventKind::Change => "change",
            EventKind::Click => "click",
            EventKind::Select => "select",
            EventKind::Toggle => "toggle",
            EventKind::Activate => "activate",
            EventKind::Custom(name) => name,
        }
    }

    /// Whether this kind carries a new control value.
    pub fn is_value_change(&self) -> bool {
        matches!(self, EventKind::Change)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event delivered to handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// The node that emitted the event.
    pub node: NodeId,
    /// The control's value at emission time, when the emitter supplied it.
    pub value: Option<Value>,
}

impl Event {
    pub fn new(kind: EventKind, node: NodeId) -> Self {
        Self {
            kind,
            node,
            value: None,
        }
    }

    /// Attach the control's value (builder).
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}
