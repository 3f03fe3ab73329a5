//! Ui: the application-root context.
//!
//! [`Ui`] ties together the state store, the component arena, the id
//! registry, the grid placement table, and the toolkit collaborator. Every
//! builder call funnels through it, so there is no global state: a fresh
//! `Ui` is a fully isolated instance.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::binding::BindingBridge;
use crate::builder::NodeMut;
use crate::dom::config::{Config, Props};
use crate::dom::kind::Kind;
use crate::dom::node::{Binding, BindingMode, NodeData, NodeId};
use crate::dom::registry::Registry;
use crate::dom::tree::Dom;
use crate::error::{Error, Result};
use crate::event::{dispatch, Event, EventKind, HandlerFn};
use crate::geometry::{Region, Size};
use crate::layout::{
    preview, Align, GridLayout, GridPlacement, GridResolution, OverlapPolicy, PlacementId,
    PreviewOptions, SizeRequest,
};
use crate::state::{Map, Path, StateStore, StoreConfig};
use crate::toolkit::{Handle, HandleSlot, SharedToolkit};

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Behavior switches for a [`Ui`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    /// Maximum nesting of store notifications.
    pub max_watcher_depth: usize,
    /// Reject an id already registered to another live node with
    /// [`Error::DuplicateId`] instead of replacing the entry.
    pub strict_ids: bool,
    /// What grid placement does with overlapping cells.
    pub overlap_policy: OverlapPolicy,
    /// Push the store value into an already realized control at bind time.
    pub push_on_bind: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_watcher_depth: StoreConfig::default().max_depth,
            strict_ids: false,
            overlap_policy: OverlapPolicy::Allow,
            push_on_bind: true,
        }
    }
}

impl UiConfig {
    /// The default configuration; same as [`UiConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the notification depth limit (builder).
    pub fn with_max_watcher_depth(mut self, depth: usize) -> Self {
        self.max_watcher_depth = depth;
        self
    }

    /// Enable or disable strict id registration (builder).
    pub fn with_strict_ids(mut self, strict: bool) -> Self {
        self.strict_ids = strict;
        self
    }

    /// Set the grid overlap policy (builder).
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Enable or disable the bind-time push (builder).
    pub fn with_push_on_bind(mut self, push: bool) -> Self {
        self.push_on_bind = push;
        self
    }
}

// ---------------------------------------------------------------------------
// Ui
// ---------------------------------------------------------------------------

/// The application-root context.
pub struct Ui {
    store: StateStore,
    dom: Dom,
    registry: Registry,
    grid: GridLayout,
    toolkit: SharedToolkit,
    config: UiConfig,
}

impl Ui {
    /// A context with default configuration driving `toolkit`.
    pub fn new(toolkit: SharedToolkit) -> Self {
        Self::with_config(UiConfig::default(), toolkit)
    }

    /// A context with `config` and a fresh store sized by its watcher depth.
    pub fn with_config(config: UiConfig, toolkit: SharedToolkit) -> Self {
        let store = StateStore::with_config(StoreConfig {
            max_depth: config.max_watcher_depth,
        });
        Self::with_store(config, store, toolkit)
    }

    /// A context sharing an existing store.
    pub fn with_store(config: UiConfig, store: StateStore, toolkit: SharedToolkit) -> Self {
        Self {
            store,
            dom: Dom::new(),
            registry: Registry::new(),
            grid: GridLayout::with_overlap_policy(config.overlap_policy),
            toolkit,
            config,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The state store. Clones share data and watchers.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// The component arena.
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// The id registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Grid placements for every grid container.
    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    /// The configuration this context was built with.
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// The toolkit collaborator.
    pub fn toolkit(&self) -> &SharedToolkit {
        &self.toolkit
    }

    /// The node's data, if it exists.
    pub fn get(&self, node: NodeId) -> Option<&NodeData> {
        self.dom.get(node)
    }

    /// The node's native handle, once realized.
    pub fn handle(&self, node: NodeId) -> Option<Handle> {
        self.dom.get(node).and_then(NodeData::handle)
    }

    // ── Construction ─────────────────────────────────────────────────

    /// Create a detached node of `kind` with default configuration.
    pub fn create(&mut self, kind: Kind) -> NodeMut<'_> {
        let node = self.dom.insert(NodeData::new(kind));
        tracing::debug!(%kind, ?node, "created node");
        NodeMut::new(self, node)
    }

    /// Create a node with `overrides` merged onto the kind's defaults.
    pub fn create_with(&mut self, kind: Kind, overrides: Map) -> Result<NodeMut<'_>> {
        let config = Config::with_overrides(kind, overrides)?;
        let node = self.dom.insert(NodeData::with_config(config));
        tracing::debug!(%kind, ?node, "created node");
        Ok(NodeMut::new(self, node))
    }

    /// A builder handle for an existing node.
    pub fn node(&mut self, node: NodeId) -> Option<NodeMut<'_>> {
        self.dom.contains(node).then(|| NodeMut::new(self, node))
    }

    /// The live node registered under `id`. A miss is `None`.
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.registry.resolve(id, &self.dom)
    }

    /// Append `child` to `container`.
    ///
    /// Adding to a container that is already realized realizes the child and
    /// attaches it right away.
    pub fn add_child(&mut self, container: NodeId, child: NodeId) -> Result<()> {
        self.dom.append_child(container, child)?;
        if let Some(parent) = self.handle(container) {
            self.attach(container, parent, child)?;
        }
        Ok(())
    }

    /// Assign `id` to `node` and register it.
    ///
    /// An id held by another node is replaced, or refused with
    /// [`Error::DuplicateId`] under [`UiConfig::strict_ids`].
    pub fn set_id(&mut self, node: NodeId, id: &str) -> Result<()> {
        let previous_id = self.dom.node(node)?.id.clone();
        match self.registry.resolve(id, &self.dom) {
            Some(existing) if existing != node && self.config.strict_ids => {
                return Err(Error::DuplicateId(id.to_owned()));
            }
            Some(existing) if existing != node => {
                tracing::warn!(id, ?existing, ?node, "id re-registered, previous node replaced");
            }
            _ => {}
        }

        if let Some(old) = previous_id.filter(|old| old != id) {
            if self.registry.get(&old) == Some(node) {
                self.registry.unregister(&old);
            }
        }
        self.registry.register(id, node);
        self.dom.node_mut(node)?.id = Some(id.to_owned());
        tracing::debug!(id, ?node, "registered id");
        Ok(())
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Set a configuration property by name; unknown keys become options.
    pub fn set_config(&mut self, node: NodeId, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update_config(node, key, |config| config.set(key, value))
    }

    /// Set a property the node's kind must know.
    pub fn set_property(&mut self, node: NodeId, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update_config(node, key, |config| config.set_known(key, value))
    }

    /// Store a custom property in the option map, bypassing the typed layer.
    pub fn set_option(&mut self, node: NodeId, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update_config(node, key, |config| {
            config.options.insert(key.to_owned(), value);
            Ok(())
        })
    }

    /// Mutate the node's configuration through `f`.
    pub(crate) fn update_config(
        &mut self,
        node: NodeId,
        key: &str,
        f: impl FnOnce(&mut Config) -> Result<()>,
    ) -> Result<()> {
        let data = self.dom.node_mut(node)?;
        f(&mut data.config)?;
        if data.is_realized() {
            tracing::warn!(
                kind = %data.kind,
                key,
                "configuration changed after realize; the native widget keeps its old value"
            );
        }
        Ok(())
    }

    // ── Binding and events ───────────────────────────────────────────

    /// Bind `node`'s value to the store at `path`.
    ///
    /// Registers a store watcher that pushes into the control and, for
    /// two-way bindings on editable kinds, a `change` handler that writes
    /// back. If the node is already realized the current store value is
    /// pushed immediately (see [`UiConfig::push_on_bind`]).
    pub fn bind(&mut self, node: NodeId, path: &str, mode: BindingMode) -> Result<()> {
        let path = Path::parse(path)?;
        let data = self.dom.node(node)?;
        let kind = data.kind;
        if kind.value_kind().is_none() {
            return Err(Error::configuration(kind, "has no value to bind"));
        }
        if let Some(existing) = &data.binding {
            return Err(Error::configuration(
                kind,
                format!("is already bound to {:?}", existing.path.as_str()),
            ));
        }

        let bridge = BindingBridge::new(
            self.store.clone(),
            path.clone(),
            SharedToolkit::clone(&self.toolkit),
            HandleSlot::clone(&data.handle),
        );
        let watch = self.store.watch(path.as_str(), bridge.watcher())?;
        if mode == BindingMode::TwoWay && kind.is_editable() {
            self.add_handler(node, EventKind::Change, bridge.change_handler())?;
        }
        let realized = self.handle(node).is_some();
        self.dom.node_mut(node)?.binding = Some(Binding { path, mode, watch });
        tracing::debug!(%kind, path = %bridge.path(), ?mode, "bound node");

        if realized && self.config.push_on_bind {
            bridge.push_current()?;
        }
        Ok(())
    }

    /// Register `handler` for `kind` events on `node`.
    pub fn on(
        &mut self,
        node: NodeId,
        kind: EventKind,
        handler: impl Fn(&Event) -> Result<()> + 'static,
    ) -> Result<()> {
        self.add_handler(node, kind, Rc::new(handler))
    }

    /// Handlers added after realize connect their kind on first use.
    fn add_handler(&mut self, node: NodeId, kind: EventKind, handler: Rc<HandlerFn>) -> Result<()> {
        let data = self.dom.node_mut(node)?;
        let first_of_kind = data.handlers.count(&kind) == 0;
        data.handlers.push(kind.clone(), handler);
        match data.handle() {
            Some(handle) if first_of_kind => self.toolkit.borrow_mut().connect(handle, &kind),
            _ => {}
        }
        Ok(())
    }

    /// Deliver a native event to `node`'s handlers in registration order.
    ///
    /// This is the entry point for the toolkit's event loop. Handler errors
    /// stop dispatch and are returned.
    pub fn emit(&self, node: NodeId, kind: EventKind, value: Option<Value>) -> Result<()> {
        let handlers = self.dom.node(node)?.handlers.handlers_for(&kind);
        tracing::trace!(?node, %kind, handlers = handlers.len(), "emitting event");
        let event = Event { kind, node, value };
        dispatch(&handlers, &event)
    }

    // ── Grid placement ───────────────────────────────────────────────

    /// Place `child` in grid `container` at `(row, col)` with the given spans.
    ///
    /// The placement is validated first; a refused placement leaves the tree
    /// untouched. The child is then appended to the container if it is not
    /// already one of its children. Placing it again replaces the earlier
    /// placement.
    pub fn place(
        &mut self,
        container: NodeId,
        child: NodeId,
        row: u32,
        col: u32,
        rowspan: u32,
        colspan: u32,
    ) -> Result<PlacementId> {
        let container_kind = self.dom.node(container)?.kind;
        if container_kind != Kind::Grid {
            return Err(Error::configuration(container_kind, "is not a grid"));
        }
        let child_kind = self.dom.node(child)?.kind;
        let placement = GridPlacement::new(child, child_kind, row, col, rowspan, colspan);
        self.grid.check(container, &placement)?;
        let already_child = self.dom.parent(child) == Some(container);
        if !already_child {
            self.dom.append_child(container, child)?;
        }
        let id = self.grid.place(container, placement)?;
        match self.handle(container) {
            Some(handle) if !already_child => self.attach(container, handle, child)?,
            Some(_) => tracing::warn!(?child, "placement changed after realize; not applied"),
            None => {}
        }
        Ok(id)
    }

    /// Set a placement's alignment inside its cell area.
    pub fn align(&mut self, id: PlacementId, h_align: Align, v_align: Align) -> Result<()> {
        self.grid.align(id, h_align, v_align)
    }

    /// Set whether a placement claims extra space on each axis.
    pub fn expand(&mut self, id: PlacementId, h_expand: bool, v_expand: bool) -> Result<()> {
        self.grid.expand(id, h_expand, v_expand)
    }

    /// Change a placement's spans, validated like [`Ui::place`].
    pub fn span(&mut self, id: PlacementId, rowspan: u32, colspan: u32) -> Result<()> {
        self.grid.span(id, rowspan, colspan)
    }

    /// Resolve a grid container into layout directives.
    pub fn resolve(&self, container: NodeId) -> Result<GridResolution> {
        let kind = self.dom.node(container)?.kind;
        if kind != Kind::Grid {
            return Err(Error::configuration(kind, "is not a grid"));
        }
        Ok(self.grid.resolve(container, &self.dom))
    }

    /// Concrete child rectangles of a grid container laid out at `available`.
    pub fn preview_layout(&self, container: NodeId, available: Size) -> Result<IndexMap<NodeId, Region>> {
        let resolution = self.resolve(container)?;
        let options = match &self.dom.node(container)?.config.props {
            Props::Grid(props) => PreviewOptions {
                row_spacing: props.row_spacing,
                column_spacing: props.column_spacing,
                row_homogeneous: props.row_homogeneous,
                column_homogeneous: props.column_homogeneous,
            },
            _ => PreviewOptions::default(),
        };
        let requests: HashMap<NodeId, SizeRequest> = self
            .dom
            .children(container)
            .iter()
            .filter_map(|&child| {
                let common = &self.dom.get(child)?.config.common;
                Some((
                    child,
                    SizeRequest {
                        width: common.width_request,
                        height: common.height_request,
                    },
                ))
            })
            .collect();
        preview(&resolution, options, &requests, available)
    }

    // ── Realization ──────────────────────────────────────────────────

    /// Create the native widget for `node` and its subtree.
    ///
    /// Idempotent: a realized node returns its cached handle without touching
    /// the toolkit. The first call creates the widget from the current
    /// configuration, realizes and attaches children (grid children with
    /// their resolved directive), connects the event kinds that have
    /// handlers, and pushes the bound store value, if any.
    ///
    /// The handle is published only once every child is attached. If a
    /// descendant fails, the widgets created so far are kept and the next
    /// call attaches the children still missing instead of creating them
    /// again.
    pub fn realize(&mut self, node: NodeId) -> Result<Handle> {
        let data = self.dom.node(node)?;
        if let Some(handle) = data.handle() {
            return Ok(handle);
        }
        let kind = data.kind;
        let pending = data.pending;
        let handle = match pending {
            Some(handle) => handle,
            None => {
                let handle = self
                    .toolkit
                    .borrow_mut()
                    .create(kind, &data.config)
                    .map_err(|source| Error::Realization { kind, source })?;
                self.dom.node_mut(node)?.pending = Some(handle);
                handle
            }
        };

        let missing: Vec<NodeId> = {
            let data = self.dom.node(node)?;
            self.dom
                .children(node)
                .iter()
                .copied()
                .filter(|child| !data.attached.contains(child))
                .collect()
        };
        for child in missing {
            self.attach(node, handle, child)?;
        }

        let data = self.dom.node_mut(node)?;
        data.pending = None;
        {
            let mut toolkit = self.toolkit.borrow_mut();
            for event_kind in data.handlers.kinds() {
                toolkit.connect(handle, &event_kind);
            }
        }
        data.handle.set(Some(handle));
        tracing::debug!(%kind, ?handle, "realized node");

        if let Some(binding) = &self.dom.node(node)?.binding {
            self.bridge_for(node, &binding.path)?.push_current()?;
        }
        Ok(handle)
    }

    /// Realize `child` and attach it inside `parent`, whose widget is `handle`.
    fn attach(&mut self, parent: NodeId, handle: Handle, child: NodeId) -> Result<()> {
        let child_handle = self.realize(child)?;
        let parent_kind = self.dom.node(parent)?.kind;
        let resolution = (parent_kind == Kind::Grid).then(|| self.grid.resolve(parent, &self.dom));
        let directive = resolution.as_ref().and_then(|r| r.directive(child));
        self.toolkit
            .borrow_mut()
            .attach(handle, child_handle, directive)
            .map_err(|source| Error::Realization {
                kind: parent_kind,
                source,
            })?;
        self.dom.node_mut(parent)?.attached.push(child);
        Ok(())
    }

    fn bridge_for(&self, node: NodeId, path: &Path) -> Result<BindingBridge> {
        let data = self.dom.node(node)?;
        Ok(BindingBridge::new(
            self.store.clone(),
            path.clone(),
            SharedToolkit::clone(&self.toolkit),
            HandleSlot::clone(&data.handle),
        ))
    }

    /// Show the node's widget. No-op while unrealized.
    pub fn show(&self, node: NodeId) -> Result<()> {
        if let Some(handle) = self.dom.node(node)?.handle() {
            self.toolkit.borrow_mut().show(handle);
        }
        Ok(())
    }

    /// Hide the node's widget. No-op while unrealized.
    pub fn hide(&self, node: NodeId) -> Result<()> {
        if let Some(handle) = self.dom.node(node)?.handle() {
            self.toolkit.borrow_mut().hide(handle);
        }
        Ok(())
    }

    // ── Isolation ────────────────────────────────────────────────────

    /// Destroy every realized widget and clear nodes, ids, placements, store
    /// data, and watchers.
    pub fn reset(&mut self) {
        {
            let mut toolkit = self.toolkit.borrow_mut();
            for root in self.dom.roots() {
                // Children first, so containers go last.
                for node in self.dom.walk_depth_first(root).into_iter().rev() {
                    let data = self.dom.get(node);
                    let handle = data.and_then(|d| d.handle().or(d.pending));
                    if let Some(handle) = handle {
                        toolkit.destroy(handle);
                    }
                }
            }
        }
        self.dom.clear();
        self.registry.clear();
        self.grid.clear();
        self.store.reset();
        tracing::debug!("ui reset");
    }
}
