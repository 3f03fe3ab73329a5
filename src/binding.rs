//! The glue between a bound store path and a control's displayed value.
//!
//! A [`BindingBridge`] is created per bound node. It hands out two closures:
//! a store watcher that pushes new values into the native widget, and a
//! `change` handler that writes the widget's value back through the store.
//! Both share the node's [`HandleSlot`], so a binding made before realization
//! starts pushing as soon as the handle exists.

use std::rc::Rc;

use serde_json::Value;

use crate::error::Result;
use crate::event::{Event, HandlerFn};
use crate::state::{Path, StateStore};
use crate::toolkit::{HandleSlot, SharedToolkit};

/// Keeps one store path and one control in sync.
#[derive(Clone)]
pub struct BindingBridge {
    store: StateStore,
    path: Path,
    toolkit: SharedToolkit,
    handle: HandleSlot,
}

impl BindingBridge {
    pub fn new(store: StateStore, path: Path, toolkit: SharedToolkit, handle: HandleSlot) -> Self {
        Self {
            store,
            path,
            toolkit,
            handle,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Push `value` into the control. No-op while unrealized.
    pub fn push(&self, value: &Value) -> Result<()> {
        let Some(handle) = self.handle.get() else {
            return Ok(());
        };
        tracing::trace!(path = %self.path, ?handle, "pushing bound value");
        self.toolkit.borrow_mut().set_value(handle, value)?;
        Ok(())
    }

    /// Pull the current store value and push it into the control. A missing
    /// value leaves the control as configured.
    pub fn push_current(&self) -> Result<()> {
        match self.store.get(self.path.as_str()) {
            Some(value) => self.push(&value),
            None => Ok(()),
        }
    }

    /// Write the control's value back to the store.
    ///
    /// The value comes from the event when the emitter supplied one, and is
    /// read from the widget otherwise. A value equal to what the store already
    /// holds is not written again, which stops a toolkit that reports its own
    /// programmatic updates as `change` from echoing forever.
    pub fn write_back(&self, event: &Event) -> Result<()> {
        let value = match &event.value {
            Some(value) => Some(value.clone()),
            None => self
                .handle
                .get()
                .and_then(|handle| self.toolkit.borrow().get_value(handle)),
        };
        let Some(value) = value else {
            return Ok(());
        };
        if self.store.get(self.path.as_str()).as_ref() == Some(&value) {
            tracing::trace!(path = %self.path, "write-back matches store, skipped");
            return Ok(());
        }
        self.store.write_through(self.path.as_str(), value)
    }

    /// The store watcher half of the bridge.
    pub fn watcher(&self) -> impl Fn(&Value, Option<&Value>) -> Result<()> + 'static {
        let bridge = self.clone();
        move |new: &Value, _old: Option<&Value>| bridge.push(new)
    }

    /// The `change` handler half of the bridge.
    pub fn change_handler(&self) -> Rc<HandlerFn> {
        let bridge = self.clone();
        Rc::new(move |event: &Event| bridge.write_back(event))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use slotmap::KeyData;

    use super::*;
    use crate::dom::config::Config;
    use crate::dom::kind::Kind;
    use crate::dom::node::NodeId;
    use crate::event::EventKind;
    use crate::testing::HeadlessToolkit;
    use crate::toolkit::Toolkit;

    struct Rig {
        store: StateStore,
        toolkit: Rc<RefCell<HeadlessToolkit>>,
        slot: HandleSlot,
        bridge: BindingBridge,
    }

    fn rig(path: &str) -> Rig {
        let store = StateStore::new();
        let toolkit = HeadlessToolkit::shared();
        let slot = HandleSlot::default();
        let bridge = BindingBridge::new(
            store.clone(),
            Path::parse(path).unwrap(),
            toolkit.clone(),
            HandleSlot::clone(&slot),
        );
        Rig {
            store,
            toolkit,
            slot,
            bridge,
        }
    }

    fn realize(rig: &Rig, kind: Kind) {
        let handle = rig
            .toolkit
            .borrow_mut()
            .create(kind, &Config::defaults(kind))
            .unwrap();
        rig.slot.set(Some(handle));
    }

    fn change(value: Option<Value>) -> Event {
        let event = Event::new(EventKind::Change, NodeId::from(KeyData::from_ffi(1)));
        match value {
            Some(value) => event.with_value(value),
            None => event,
        }
    }

    #[test]
    fn push_is_noop_until_realized() {
        let rig = rig("form.name");
        rig.bridge.push(&json!("early")).unwrap();
        assert_eq!(rig.toolkit.borrow().set_value_calls(), 0);
    }

    #[test]
    fn watcher_pushes_store_writes() {
        let rig = rig("form.name");
        realize(&rig, Kind::Entry);
        rig.store.watch("form.name", rig.bridge.watcher()).unwrap();
        rig.store.set("form.name", "Ada").unwrap();

        let handle = rig.slot.get().unwrap();
        assert_eq!(rig.toolkit.borrow().get_value(handle), Some(json!("Ada")));
    }

    #[test]
    fn push_current_skips_missing_values() {
        let rig = rig("form.name");
        realize(&rig, Kind::Entry);
        rig.bridge.push_current().unwrap();
        assert_eq!(rig.toolkit.borrow().set_value_calls(), 0);

        rig.store.set("form.name", "Grace").unwrap();
        rig.bridge.push_current().unwrap();
        assert_eq!(rig.toolkit.borrow().set_value_calls(), 1);
    }

    #[test]
    fn write_back_prefers_event_value() {
        let rig = rig("form.age");
        realize(&rig, Kind::SpinButton);
        rig.bridge.write_back(&change(Some(json!(42)))).unwrap();
        assert_eq!(rig.store.get("form.age"), Some(json!(42)));
    }

    #[test]
    fn write_back_reads_widget_without_event_value() {
        let rig = rig("prefs.dark");
        realize(&rig, Kind::Switch);
        let handle = rig.slot.get().unwrap();
        rig.toolkit
            .borrow_mut()
            .set_value(handle, &json!(true))
            .unwrap();
        rig.bridge.write_back(&change(None)).unwrap();
        assert_eq!(rig.store.get("prefs.dark"), Some(json!(true)));
    }

    #[test]
    fn write_back_notifies_parent_watchers() {
        let rig = rig("form.name");
        rig.store.set("form.email", "a@b.c").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        rig.store
            .watch("form", move |new: &Value, _| {
                sink.borrow_mut().push(new.clone());
                Ok(())
            })
            .unwrap();

        rig.bridge.write_back(&change(Some(json!("Ada")))).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![json!({"email": "a@b.c", "name": "Ada"})]
        );
    }

    #[test]
    fn equal_value_is_not_written_again() {
        let rig = rig("form.name");
        rig.store.set("form.name", "same").unwrap();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        rig.store
            .watch("form.name", move |_: &Value, _| {
                *counter.borrow_mut() += 1;
                Ok(())
            })
            .unwrap();

        rig.bridge.write_back(&change(Some(json!("same")))).unwrap();
        assert_eq!(*calls.borrow(), 0);
    }
}
