//! Pilot: simulated user input against a headless Ui.
//!
//! The `Pilot` owns a [`Ui`] driving a [`HeadlessToolkit`]. Input methods do
//! what a user and a native event loop would do together: change the widget's
//! displayed value first, then deliver the matching events through
//! [`Ui::emit`].

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use serde_json::Value;

use super::headless::HeadlessToolkit;
use crate::app::{Ui, UiConfig};
use crate::dom::node::NodeId;
use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::toolkit::{Handle, Toolkit};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless Ui driver for testing.
///
/// # Examples
///
/// ```ignore
/// use trellis_ui::dom::Kind;
/// use trellis_ui::testing::Pilot;
///
/// let mut pilot = Pilot::new();
/// let entry = pilot.ui_mut().create(Kind::Entry).bind("form.name")?.node_id();
/// pilot.ui_mut().realize(entry)?;
/// pilot.type_value(entry, "Ada")?;
/// assert_eq!(pilot.ui().store().get("form.name"), Some("Ada".into()));
/// ```
pub struct Pilot {
    ui: Ui,
    toolkit: Rc<RefCell<HeadlessToolkit>>,
}

impl Pilot {
    pub fn new() -> Self {
        Self::with_config(UiConfig::default())
    }

    pub fn with_config(config: UiConfig) -> Self {
        let toolkit = HeadlessToolkit::shared();
        Self {
            ui: Ui::with_config(config, toolkit.clone()),
            toolkit,
        }
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui {
        &mut self.ui
    }

    /// Borrow the toolkit for inspection. Drop the guard before driving input.
    pub fn toolkit(&self) -> Ref<'_, HeadlessToolkit> {
        self.toolkit.borrow()
    }

    pub fn toolkit_mut(&self) -> RefMut<'_, HeadlessToolkit> {
        self.toolkit.borrow_mut()
    }

    /// The value the node's widget currently displays.
    pub fn displayed(&self, node: NodeId) -> Option<Value> {
        let handle = self.ui.handle(node)?;
        self.toolkit.borrow().get_value(handle)
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Replace the control's text or value as if the user edited it, then
    /// emit `change`.
    pub fn type_value(&mut self, node: NodeId, value: impl Into<Value>) -> Result<()> {
        let handle = self.realized(node)?;
        self.toolkit.borrow_mut().set_value(handle, &value.into())?;
        self.ui.emit(node, EventKind::Change, None)
    }

    /// Emit `click`.
    pub fn click(&mut self, node: NodeId) -> Result<()> {
        self.realized(node)?;
        self.ui.emit(node, EventKind::Click, None)
    }

    /// Flip a check button or switch, then emit `toggle` and `change`.
    pub fn toggle(&mut self, node: NodeId) -> Result<()> {
        let handle = self.realized(node)?;
        let active = !self.displayed(node).and_then(|v| v.as_bool()).unwrap_or(false);
        self.toolkit
            .borrow_mut()
            .set_value(handle, &Value::Bool(active))?;
        self.ui.emit(node, EventKind::Toggle, Some(Value::Bool(active)))?;
        self.ui.emit(node, EventKind::Change, None)
    }

    /// Choose `item` in a combo box, then emit `select` and `change`.
    pub fn select(&mut self, node: NodeId, item: &str) -> Result<()> {
        let handle = self.realized(node)?;
        let value = Value::String(item.to_owned());
        self.toolkit.borrow_mut().set_value(handle, &value)?;
        self.ui.emit(node, EventKind::Select, Some(value))?;
        self.ui.emit(node, EventKind::Change, None)
    }

    fn realized(&self, node: NodeId) -> Result<Handle> {
        let data = self.ui.get(node).ok_or(Error::UnknownNode)?;
        data.handle()
            .ok_or_else(|| Error::configuration(data.kind, "is not realized"))
    }
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::dom::kind::Kind;

    #[test]
    fn type_value_writes_back_through_binding() {
        let mut pilot = Pilot::new();
        let entry = pilot
            .ui_mut()
            .create(Kind::Entry)
            .bind("form.name")
            .unwrap()
            .node_id();
        pilot.ui_mut().realize(entry).unwrap();
        pilot.type_value(entry, "Ada").unwrap();
        assert_eq!(pilot.ui().store().get("form.name"), Some(json!("Ada")));
        assert_eq!(pilot.displayed(entry), Some(json!("Ada")));
    }

    #[test]
    fn input_requires_realized_node() {
        let mut pilot = Pilot::new();
        let entry = pilot.ui_mut().create(Kind::Entry).node_id();
        let err = pilot.type_value(entry, "x").unwrap_err();
        assert_eq!(err.to_string(), "configuration error on Entry: is not realized");
    }

    #[test]
    fn click_runs_handlers() {
        let mut pilot = Pilot::new();
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let button = pilot
            .ui_mut()
            .create(Kind::Button)
            .on(EventKind::Click, move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            })
            .unwrap()
            .node_id();
        pilot.ui_mut().realize(button).unwrap();
        pilot.click(button).unwrap();
        pilot.click(button).unwrap();
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn toggle_flips_and_writes_back() {
        let mut pilot = Pilot::new();
        let switch = pilot
            .ui_mut()
            .create(Kind::Switch)
            .bind("prefs.dark")
            .unwrap()
            .node_id();
        pilot.ui_mut().realize(switch).unwrap();
        pilot.toggle(switch).unwrap();
        assert_eq!(pilot.ui().store().get("prefs.dark"), Some(json!(true)));
        pilot.toggle(switch).unwrap();
        assert_eq!(pilot.ui().store().get("prefs.dark"), Some(json!(false)));
    }

    #[test]
    fn select_emits_select_then_change() {
        let mut pilot = Pilot::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let combo = pilot
            .ui_mut()
            .create(Kind::ComboBox)
            .items(["red", "green"])
            .unwrap()
            .on(EventKind::Select, move |event| {
                sink.borrow_mut().push(event.value.clone());
                Ok(())
            })
            .unwrap()
            .bind("color")
            .unwrap()
            .node_id();
        pilot.ui_mut().realize(combo).unwrap();
        pilot.select(combo, "green").unwrap();
        assert_eq!(*seen.borrow(), vec![Some(json!("green"))]);
        assert_eq!(pilot.ui().store().get("color"), Some(json!("green")));
    }
}
