//! Fluent construction: [`NodeMut`] and [`PlacementMut`].
//!
//! A `NodeMut` borrows the [`Ui`] mutably and forwards every call to it, so a
//! chain reads like a declaration:
//!
//! ```ignore
//! let name = ui
//!     .create(Kind::Entry)
//!     .placeholder("Your name")?
//!     .id("name")?
//!     .bind("form.name")?
//!     .node_id();
//! let form = ui
//!     .create(Kind::Grid)
//!     .column_spacing(6)?
//!     .place(name, 0, 1)?
//!     .container()
//!     .node_id();
//! ```
//!
//! Typed setters exist for the well-known properties. Calling one on a kind
//! without that property is a configuration error; use
//! [`with_option`](NodeMut::with_option) or [`set_config`](NodeMut::set_config)
//! for anything else.

use serde_json::Value;

use crate::app::Ui;
use crate::dom::config::Orientation;
use crate::dom::kind::Kind;
use crate::dom::node::{BindingMode, NodeId};
use crate::error::{Error, Result};
use crate::event::{Event, EventKind};
use crate::layout::{Align, PlacementId};
use crate::toolkit::Handle;

/// Builder handle for one node.
pub struct NodeMut<'a> {
    ui: &'a mut Ui,
    node: NodeId,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(ui: &'a mut Ui, node: NodeId) -> Self {
        Self { ui, node }
    }

    /// The node being built. Ends the chain.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> Kind {
        self.ui.get(self.node).map_or(Kind::Label, |data| data.kind)
    }

    fn property(self, key: &str, value: impl Into<Value>) -> Result<Self> {
        self.ui.set_property(self.node, key, value)?;
        Ok(self)
    }

    // ── Typed properties ─────────────────────────────────────────────

    /// Button, frame, and toggle caption.
    pub fn label(self, label: &str) -> Result<Self> {
        self.property("label", label)
    }

    /// Text of labels, entries, text views, and progress bars.
    pub fn text(self, text: &str) -> Result<Self> {
        self.property("text", text)
    }

    pub fn title(self, title: &str) -> Result<Self> {
        self.property("title", title)
    }

    pub fn placeholder(self, placeholder: &str) -> Result<Self> {
        self.property("placeholder", placeholder)
    }

    /// Current value of a scale or spin button.
    pub fn value(self, value: f64) -> Result<Self> {
        self.property("value", value)
    }

    pub fn active(self, active: bool) -> Result<Self> {
        self.property("active", active)
    }

    pub fn range(self, min: f64, max: f64) -> Result<Self> {
        if min > max {
            return Err(Error::configuration(
                self.kind(),
                format!("range minimum {min} is above maximum {max}"),
            ));
        }
        self.property("min", min)?.property("max", max)
    }

    pub fn step(self, step: f64) -> Result<Self> {
        self.property("step", step)
    }

    pub fn digits(self, digits: u32) -> Result<Self> {
        self.property("digits", digits)
    }

    /// Items of a combo box.
    pub fn items<I, S>(self, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<Value> = items.into_iter().map(|s| Value::String(s.into())).collect();
        self.property("items", items)
    }

    pub fn orientation(self, orientation: Orientation) -> Result<Self> {
        let value = serde_json::to_value(orientation)
            .map_err(|e| Error::configuration(self.kind(), e.to_string()))?;
        self.property("orientation", value)
    }

    /// Gap between box children.
    pub fn spacing(self, spacing: u32) -> Result<Self> {
        self.property("spacing", spacing)
    }

    pub fn row_spacing(self, spacing: u32) -> Result<Self> {
        self.property("row_spacing", spacing)
    }

    pub fn column_spacing(self, spacing: u32) -> Result<Self> {
        self.property("column_spacing", spacing)
    }

    /// Equal-size children. On a grid this applies to rows and columns.
    pub fn homogeneous(self, homogeneous: bool) -> Result<Self> {
        if self.kind() == Kind::Grid {
            self.property("row_homogeneous", homogeneous)?
                .property("column_homogeneous", homogeneous)
        } else {
            self.property("homogeneous", homogeneous)
        }
    }

    /// Initial window size.
    pub fn default_size(self, width: u32, height: u32) -> Result<Self> {
        self.property("default_width", width)?
            .property("default_height", height)
    }

    pub fn fraction(self, fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::configuration(
                self.kind(),
                format!("fraction {fraction} is outside 0..=1"),
            ));
        }
        self.property("fraction", fraction)
    }

    /// Icon name of a button or image.
    pub fn icon(self, icon: &str) -> Result<Self> {
        self.property("icon", icon)
    }

    pub fn editable(self, editable: bool) -> Result<Self> {
        self.property("editable", editable)
    }

    pub fn wrap(self, wrap: bool) -> Result<Self> {
        self.property("wrap", wrap)
    }

    // ── Common properties ────────────────────────────────────────────

    pub fn visible(self, visible: bool) -> Result<Self> {
        self.property("visible", visible)
    }

    pub fn sensitive(self, sensitive: bool) -> Result<Self> {
        self.property("sensitive", sensitive)
    }

    pub fn tooltip(self, tooltip: &str) -> Result<Self> {
        self.property("tooltip", tooltip)
    }

    /// Minimum size the control asks for.
    pub fn size_request(self, width: u32, height: u32) -> Result<Self> {
        self.property("width_request", width)?
            .property("height_request", height)
    }

    /// Append a style class.
    pub fn css_class(self, class: &str) -> Result<Self> {
        self.ui.update_config(self.node, "css_classes", |config| {
            if !config.common.css_classes.iter().any(|c| c == class) {
                config.common.css_classes.push(class.to_owned());
            }
            Ok(())
        })?;
        Ok(self)
    }

    // ── Generic configuration ────────────────────────────────────────

    /// Store a custom property in the option map.
    pub fn with_option(self, key: &str, value: impl Into<Value>) -> Result<Self> {
        self.ui.set_option(self.node, key, value)?;
        Ok(self)
    }

    /// Set any property by name. Known keys are type-checked, unknown keys
    /// become options.
    pub fn set_config(self, key: &str, value: impl Into<Value>) -> Result<Self> {
        self.ui.set_config(self.node, key, value)?;
        Ok(self)
    }

    // ── Structure ────────────────────────────────────────────────────

    pub fn add_child(self, child: NodeId) -> Result<Self> {
        self.ui.add_child(self.node, child)?;
        Ok(self)
    }

    /// Append every node of `children`, in order.
    pub fn contains(self, children: impl IntoIterator<Item = NodeId>) -> Result<Self> {
        for child in children {
            self.ui.add_child(self.node, child)?;
        }
        Ok(self)
    }

    /// Assign and register an id.
    pub fn id(self, id: &str) -> Result<Self> {
        self.ui.set_id(self.node, id)?;
        Ok(self)
    }

    // ── Binding and events ───────────────────────────────────────────

    /// Two-way bind the control's value to `path`.
    pub fn bind(self, path: &str) -> Result<Self> {
        self.bind_with(path, BindingMode::TwoWay)
    }

    pub fn bind_with(self, path: &str, mode: BindingMode) -> Result<Self> {
        self.ui.bind(self.node, path, mode)?;
        Ok(self)
    }

    pub fn on(self, kind: EventKind, handler: impl Fn(&Event) -> Result<()> + 'static) -> Result<Self> {
        self.ui.on(self.node, kind, handler)?;
        Ok(self)
    }

    // ── Grid ─────────────────────────────────────────────────────────

    /// Place `child` in this grid at `(row, col)` with single spans.
    pub fn place(self, child: NodeId, row: u32, col: u32) -> Result<PlacementMut<'a>> {
        let id = self.ui.place(self.node, child, row, col, 1, 1)?;
        Ok(PlacementMut { ui: self.ui, id })
    }

    // ── Realization ──────────────────────────────────────────────────

    /// Realize this node and its subtree. Ends the chain.
    pub fn realize(self) -> Result<Handle> {
        self.ui.realize(self.node)
    }

    pub fn show(self) -> Result<Self> {
        self.ui.show(self.node)?;
        Ok(self)
    }

    pub fn hide(self) -> Result<Self> {
        self.ui.hide(self.node)?;
        Ok(self)
    }
}

/// Builder handle for one grid placement.
pub struct PlacementMut<'a> {
    ui: &'a mut Ui,
    id: PlacementId,
}

impl<'a> PlacementMut<'a> {
    pub fn id(&self) -> PlacementId {
        self.id
    }

    pub fn span(self, rowspan: u32, colspan: u32) -> Result<Self> {
        self.ui.span(self.id, rowspan, colspan)?;
        Ok(self)
    }

    pub fn align(self, h_align: Align, v_align: Align) -> Result<Self> {
        self.ui.align(self.id, h_align, v_align)?;
        Ok(self)
    }

    pub fn expand(self, h_expand: bool, v_expand: bool) -> Result<Self> {
        self.ui.expand(self.id, h_expand, v_expand)?;
        Ok(self)
    }

    /// Back to the grid's builder.
    pub fn container(self) -> NodeMut<'a> {
        NodeMut::new(self.ui, self.id.container)
    }

    /// Place another child in the same grid.
    pub fn place(self, child: NodeId, row: u32, col: u32) -> Result<PlacementMut<'a>> {
        self.container().place(child, row, col)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::dom::config::Props;
    use crate::testing::HeadlessToolkit;

    fn ui() -> Ui {
        Ui::new(HeadlessToolkit::shared())
    }

    #[test]
    fn typed_setters_write_config() {
        let mut ui = ui();
        let entry = ui
            .create(Kind::Entry)
            .text("hi")
            .unwrap()
            .placeholder("type here")
            .unwrap()
            .editable(false)
            .unwrap()
            .tooltip("name")
            .unwrap()
            .node_id();
        let config = &ui.get(entry).unwrap().config;
        assert_eq!(config.get("text"), Some(json!("hi")));
        assert_eq!(config.get("placeholder"), Some(json!("type here")));
        assert_eq!(config.get("editable"), Some(json!(false)));
        assert_eq!(config.common.tooltip.as_deref(), Some("name"));
    }

    #[test]
    fn setter_on_wrong_kind_is_rejected() {
        let mut ui = ui();
        let err = ui.create(Kind::Button).placeholder("nope").err().unwrap();
        assert!(matches!(err, Error::Configuration { kind: Kind::Button, .. }));
    }

    #[test]
    fn range_setters() {
        let mut ui = ui();
        let scale = ui
            .create(Kind::Scale)
            .range(-10.0, 10.0)
            .unwrap()
            .step(0.5)
            .unwrap()
            .digits(1)
            .unwrap()
            .value(2.5)
            .unwrap()
            .orientation(Orientation::Vertical)
            .unwrap()
            .node_id();
        match &ui.get(scale).unwrap().config.props {
            Props::Scale(p) => {
                assert_eq!((p.min, p.max, p.step, p.value), (-10.0, 10.0, 0.5, 2.5));
                assert_eq!(p.digits, 1);
                assert_eq!(p.orientation, Orientation::Vertical);
            }
            other => panic!("unexpected props {other:?}"),
        }
        assert!(ui.create(Kind::Scale).range(5.0, 1.0).is_err());
    }

    #[test]
    fn homogeneous_on_grid_sets_both_axes() {
        let mut ui = ui();
        let grid = ui.create(Kind::Grid).homogeneous(true).unwrap().node_id();
        let config = &ui.get(grid).unwrap().config;
        assert_eq!(config.get("row_homogeneous"), Some(json!(true)));
        assert_eq!(config.get("column_homogeneous"), Some(json!(true)));

        let vbox = ui.create(Kind::Box).homogeneous(true).unwrap().node_id();
        assert_eq!(ui.get(vbox).unwrap().config.get("homogeneous"), Some(json!(true)));
    }

    #[test]
    fn window_and_choice_setters() {
        let mut ui = ui();
        let window = ui
            .create(Kind::Window)
            .title("Settings")
            .unwrap()
            .default_size(640, 480)
            .unwrap()
            .node_id();
        assert_eq!(ui.get(window).unwrap().config.get("default_height"), Some(json!(480)));

        let combo = ui.create(Kind::ComboBox).items(["red", "green"]).unwrap().node_id();
        assert_eq!(ui.get(combo).unwrap().config.get("items"), Some(json!(["red", "green"])));
    }

    #[test]
    fn fraction_is_bounded() {
        let mut ui = ui();
        assert!(ui.create(Kind::ProgressBar).fraction(1.5).is_err());
        let bar = ui.create(Kind::ProgressBar).fraction(0.25).unwrap().node_id();
        assert_eq!(ui.get(bar).unwrap().config.get("fraction"), Some(json!(0.25)));
    }

    #[test]
    fn css_classes_are_deduplicated() {
        let mut ui = ui();
        let label = ui
            .create(Kind::Label)
            .css_class("title")
            .unwrap()
            .css_class("title")
            .unwrap()
            .css_class("dim")
            .unwrap()
            .node_id();
        assert_eq!(ui.get(label).unwrap().config.common.css_classes, vec!["title", "dim"]);
    }

    #[test]
    fn options_and_generic_config() {
        let mut ui = ui();
        let button = ui
            .create(Kind::Button)
            .with_option("data-test-id", "ok")
            .unwrap()
            .set_config("label", "OK")
            .unwrap()
            .node_id();
        let config = &ui.get(button).unwrap().config;
        assert_eq!(config.options.get("data-test-id"), Some(&json!("ok")));
        assert_eq!(config.get("label"), Some(json!("OK")));
    }

    #[test]
    fn leaf_add_child_fails_container_succeeds() {
        let mut ui = ui();
        let child = ui.create(Kind::Label).node_id();
        let err = ui.create(Kind::Button).add_child(child).err().unwrap();
        assert_eq!(err.to_string(), "configuration error on Button: cannot have children");

        let vbox = ui.create(Kind::Box).add_child(child).unwrap().node_id();
        assert_eq!(ui.dom().children(vbox), &[child]);
    }

    #[test]
    fn placement_chain() {
        let mut ui = ui();
        let label = ui.create(Kind::Label).node_id();
        let entry = ui.create(Kind::Entry).node_id();
        let grid = ui
            .create(Kind::Grid)
            .place(label, 0, 0)
            .unwrap()
            .align(Align::End, Align::Center)
            .unwrap()
            .place(entry, 0, 1)
            .unwrap()
            .span(1, 2)
            .unwrap()
            .expand(true, true)
            .unwrap()
            .container()
            .node_id();

        let resolution = ui.resolve(grid).unwrap();
        assert_eq!((resolution.rows, resolution.columns), (1, 3));
        assert_eq!(resolution.directive(label).unwrap().h_align, Align::End);
        assert!(resolution.directive(entry).unwrap().v_expand);
    }

    #[test]
    fn bind_and_realize_chain() {
        let mut ui = ui();
        ui.store().set("form.name", "Ada").unwrap();
        let handle = ui.create(Kind::Entry).bind("form.name").unwrap().realize().unwrap();
        let value = ui.toolkit().borrow().get_value(handle);
        assert_eq!(value, Some(json!("Ada")));
    }

    #[test]
    fn node_reopens_existing() {
        let mut ui = ui();
        let label = ui.create(Kind::Label).node_id();
        ui.node(label).unwrap().text("again").unwrap();
        assert_eq!(ui.get(label).unwrap().config.get("text"), Some(json!("again")));
    }
}
