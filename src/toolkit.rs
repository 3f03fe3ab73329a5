//! The native toolkit boundary.
//!
//! trellis-ui never draws anything itself. Realizing a node asks a
//! [`Toolkit`] implementation for an opaque native [`Handle`], and from then on
//! values, attachments, and visibility are pushed through the same trait.
//! Native events travel the other way: the application's event loop forwards
//! them to [`Ui::emit`](crate::app::Ui::emit).

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::dom::config::Config;
use crate::dom::kind::Kind;
use crate::event::EventKind;
use crate::layout::LayoutDirective;

/// Opaque identifier of a native widget, issued by the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

/// An error reported by the toolkit, surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolkitError {
    pub message: String,
}

impl ToolkitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Operations trellis-ui needs from a native UI toolkit.
///
/// Implementations must not call back into the [`Ui`](crate::app::Ui) from
/// inside these methods; deliver native events after the call returns.
pub trait Toolkit {
    /// Create a native widget for `kind`, configured from `config`.
    fn create(&mut self, kind: Kind, config: &Config) -> Result<Handle, ToolkitError>;

    /// Destroy a native widget. Only [`Ui::reset`](crate::app::Ui::reset)
    /// tears widgets down.
    fn destroy(&mut self, handle: Handle);

    /// The widget's currently displayed value, if it has one.
    fn get_value(&self, handle: Handle) -> Option<Value>;

    /// Replace the widget's displayed value.
    fn set_value(&mut self, handle: Handle, value: &Value) -> Result<(), ToolkitError>;

    /// Ask the toolkit to forward native events of `kind` for this widget.
    fn connect(&mut self, handle: Handle, kind: &EventKind);

    /// Attach `child` inside `parent`. Grid containers pass the child's
    /// resolved placement; other containers pass `None`.
    fn attach(
        &mut self,
        parent: Handle,
        child: Handle,
        directive: Option<&LayoutDirective>,
    ) -> Result<(), ToolkitError>;

    fn show(&mut self, handle: Handle);

    fn hide(&mut self, handle: Handle);
}

/// Shared, single-threaded toolkit reference.
pub type SharedToolkit = Rc<RefCell<dyn Toolkit>>;

/// A node's realized handle, shared with the binding glue so that watchers
/// registered before realization can see the handle once it exists.
pub type HandleSlot = Rc<std::cell::Cell<Option<Handle>>>;
