//! HeadlessToolkit: an in-memory [`Toolkit`] that records every call.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use serde_json::Value;

use crate::dom::config::Config;
use crate::dom::kind::Kind;
use crate::event::EventKind;
use crate::layout::LayoutDirective;
use crate::toolkit::{Handle, Toolkit, ToolkitError};

/// A child attached inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub child: Handle,
    pub directive: Option<LayoutDirective>,
}

/// The recorded state of one fake widget.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWidget {
    pub kind: Kind,
    /// Configuration snapshot taken at creation.
    pub config: Config,
    pub value: Option<Value>,
    pub visible: bool,
    pub connected: Vec<EventKind>,
    pub attachments: Vec<Attachment>,
}

/// A toolkit that creates nothing real.
///
/// Handles are issued sequentially from 1. Creation of a kind can be made to
/// fail with [`fail_on`](Self::fail_on) to exercise realization errors.
#[derive(Debug, Default)]
pub struct HeadlessToolkit {
    next_handle: u64,
    widgets: BTreeMap<Handle, HeadlessWidget>,
    created: HashMap<Kind, usize>,
    failing: HashSet<Kind>,
    destroyed: Vec<Handle>,
    set_value_calls: usize,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh toolkit behind the shared handle a [`Ui`](crate::app::Ui)
    /// expects. Keep a clone to inspect it later.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Refuse to create widgets of `kind` from now on.
    pub fn fail_on(&mut self, kind: Kind) {
        self.failing.insert(kind);
    }

    /// Allow creating widgets of `kind` again after [`fail_on`](Self::fail_on).
    pub fn recover(&mut self, kind: Kind) {
        self.failing.remove(&kind);
    }

    /// How many times the factory ran for `kind`.
    pub fn create_count(&self, kind: Kind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    /// Total factory invocations across all kinds.
    pub fn total_created(&self) -> usize {
        self.created.values().sum()
    }

    pub fn widget(&self, handle: Handle) -> Option<&HeadlessWidget> {
        self.widgets.get(&handle)
    }

    /// Live widgets in handle order.
    pub fn widgets(&self) -> impl Iterator<Item = (Handle, &HeadlessWidget)> {
        self.widgets.iter().map(|(handle, widget)| (*handle, widget))
    }

    pub fn is_visible(&self, handle: Handle) -> bool {
        self.widget(handle).is_some_and(|w| w.visible)
    }

    /// Children attached inside `parent`, in attach order.
    pub fn attachments(&self, parent: Handle) -> &[Attachment] {
        self.widget(parent)
            .map(|w| w.attachments.as_slice())
            .unwrap_or(&[])
    }

    /// Event kinds connected on `handle`, in connect order.
    pub fn connected(&self, handle: Handle) -> &[EventKind] {
        self.widget(handle)
            .map(|w| w.connected.as_slice())
            .unwrap_or(&[])
    }

    pub fn destroyed(&self) -> &[Handle] {
        &self.destroyed
    }

    /// Number of `set_value` calls received.
    pub fn set_value_calls(&self) -> usize {
        self.set_value_calls
    }

    fn widget_mut(&mut self, handle: Handle) -> Result<&mut HeadlessWidget, ToolkitError> {
        self.widgets
            .get_mut(&handle)
            .ok_or_else(|| ToolkitError::new(format!("no widget with handle {}", handle.0)))
    }
}

impl Toolkit for HeadlessToolkit {
    fn create(&mut self, kind: Kind, config: &Config) -> Result<Handle, ToolkitError> {
        if self.failing.contains(&kind) {
            return Err(ToolkitError::new(format!("cannot create {kind}")));
        }
        self.next_handle += 1;
        let handle = Handle(self.next_handle);
        *self.created.entry(kind).or_insert(0) += 1;
        self.widgets.insert(
            handle,
            HeadlessWidget {
                kind,
                config: config.clone(),
                value: config.value(),
                visible: false,
                connected: Vec::new(),
                attachments: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: Handle) {
        if self.widgets.remove(&handle).is_some() {
            self.destroyed.push(handle);
        }
    }

    fn get_value(&self, handle: Handle) -> Option<Value> {
        self.widget(handle).and_then(|w| w.value.clone())
    }

    fn set_value(&mut self, handle: Handle, value: &Value) -> Result<(), ToolkitError> {
        self.set_value_calls += 1;
        let widget = self.widget_mut(handle)?;
        if widget.kind.value_kind().is_none() {
            return Err(ToolkitError::new(format!("{} has no value", widget.kind)));
        }
        widget.value = Some(value.clone());
        Ok(())
    }

    fn connect(&mut self, handle: Handle, kind: &EventKind) {
        if let Ok(widget) = self.widget_mut(handle) {
            widget.connected.push(kind.clone());
        }
    }

    fn attach(
        &mut self,
        parent: Handle,
        child: Handle,
        directive: Option<&LayoutDirective>,
    ) -> Result<(), ToolkitError> {
        if !self.widgets.contains_key(&child) {
            return Err(ToolkitError::new(format!("no widget with handle {}", child.0)));
        }
        self.widget_mut(parent)?.attachments.push(Attachment {
            child,
            directive: directive.copied(),
        });
        Ok(())
    }

    fn show(&mut self, handle: Handle) {
        if let Ok(widget) = self.widget_mut(handle) {
            widget.visible = true;
        }
    }

    fn hide(&mut self, handle: Handle) {
        if let Ok(widget) = self.widget_mut(handle) {
            widget.visible = false;
        }
    }
}
