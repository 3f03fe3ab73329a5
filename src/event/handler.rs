//! Per-node handler table with registration-ordered dispatch.

use std::fmt;
use std::rc::Rc;

use super::message::{Event, EventKind};
use crate::error::Result;

/// An event handler. Errors stop dispatch and propagate to the emitter.
pub type HandlerFn = dyn Fn(&Event) -> Result<()>;

/// Handlers registered on one node, in registration order across all kinds.
#[derive(Default, Clone)]
pub struct HandlerTable {
    entries: Vec<(EventKind, Rc<HandlerFn>)>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `kind`.
    pub fn push(&mut self, kind: EventKind, handler: Rc<HandlerFn>) {
        self.entries.push((kind, handler));
    }

    /// Snapshot of the handlers for `kind`, in registration order.
    pub fn handlers_for(&self, kind: &EventKind) -> Vec<Rc<HandlerFn>> {
        self.entries
            .iter()
            .filter(|(k, _)| k == kind)
            .map(|(_, h)| Rc::clone(h))
            .collect()
    }

    /// Distinct kinds with at least one handler, in first-registration order.
    pub fn kinds(&self) -> Vec<EventKind> {
        let mut kinds: Vec<EventKind> = Vec::new();
        for (kind, _) in &self.entries {
            if !kinds.contains(kind) {
                kinds.push(kind.clone());
            }
        }
        kinds
    }

    /// Number of handlers for `kind`.
    pub fn count(&self, kind: &EventKind) -> usize {
        self.entries.iter().filter(|(k, _)| k == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(kind, _)| kind))
            .finish()
    }
}

/// Run `handlers` against `event` in order, stopping at the first error.
pub fn dispatch(handlers: &[Rc<HandlerFn>], event: &Event) -> Result<()> {
    handlers.iter().try_for_each(|handler| handler(event))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use slotmap::KeyData;

    use super::*;
    use crate::dom::kind::Kind;
    use crate::dom::node::NodeId;
    use crate::error::Error;

    fn node() -> NodeId {
        NodeId::from(KeyData::from_ffi(1))
    }

    fn logging(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Rc<HandlerFn> {
        let log = Rc::clone(log);
        Rc::new(move |_: &Event| {
            log.borrow_mut().push(tag);
            Ok(())
        })
    }

    #[test]
    fn empty_table() {
        let table = HandlerTable::new();
        assert!(table.is_empty());
        assert!(table.handlers_for(&EventKind::Click).is_empty());
    }

    #[test]
    fn dispatch_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = HandlerTable::new();
        table.push(EventKind::Click, logging(&log, "a"));
        table.push(EventKind::Change, logging(&log, "ignored"));
        table.push(EventKind::Click, logging(&log, "b"));

        let event = Event::new(EventKind::Click, node());
        dispatch(&table.handlers_for(&EventKind::Click), &event).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(table.count(&EventKind::Click), 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn kinds_are_distinct() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = HandlerTable::new();
        table.push(EventKind::Toggle, logging(&log, "1"));
        table.push(EventKind::Click, logging(&log, "2"));
        table.push(EventKind::Toggle, logging(&log, "3"));
        assert_eq!(table.kinds(), vec![EventKind::Toggle, EventKind::Click]);
    }

    #[test]
    fn error_stops_dispatch() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let failing: Rc<HandlerFn> =
            Rc::new(|_: &Event| Err(Error::configuration(Kind::Button, "handler failed")));
        let handlers = vec![logging(&log, "before"), failing, logging(&log, "after")];

        let event = Event::new(EventKind::Click, node());
        assert!(dispatch(&handlers, &event).is_err());
        assert_eq!(*log.borrow(), vec!["before"]);
    }
}
