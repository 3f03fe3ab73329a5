//! Grid placement records and their resolution into layout directives.
//!
//! Placements are owned by the container they were made in, keyed by the
//! container's [`NodeId`]; the child node itself is never touched. Resolution
//! infers the grid extent from the placements (`max(row + rowspan)`,
//! `max(col + colspan)`) and emits one [`LayoutDirective`] per child, which the
//! toolkit applies when attaching children at realize time.

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use crate::dom::kind::Kind;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::error::{Error, Result};

/// Alignment of a child inside its cell area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Fill,
}

/// Default alignment and expansion for children of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDefaults {
    pub h_align: Align,
    pub v_align: Align,
    pub h_expand: bool,
    pub v_expand: bool,
}

impl GridDefaults {
    /// `fill` on both axes, no expansion.
    pub const FILL: GridDefaults = GridDefaults::new(Align::Fill, Align::Fill, false, false);

    const fn new(h_align: Align, v_align: Align, h_expand: bool, v_expand: bool) -> Self {
        Self {
            h_align,
            v_align,
            h_expand,
            v_expand,
        }
    }
}

/// Per-kind placement defaults. Kinds not listed use [`GridDefaults::FILL`].
const GRID_DEFAULTS: &[(Kind, GridDefaults)] = &[
    (Kind::Label, GridDefaults::new(Align::Start, Align::Center, false, false)),
    (Kind::CheckButton, GridDefaults::new(Align::Start, Align::Center, false, false)),
    (Kind::Switch, GridDefaults::new(Align::Start, Align::Center, false, false)),
    (Kind::SpinButton, GridDefaults::new(Align::Start, Align::Center, false, false)),
    (Kind::Entry, GridDefaults::new(Align::Fill, Align::Center, true, false)),
    (Kind::ComboBox, GridDefaults::new(Align::Fill, Align::Center, true, false)),
    (Kind::Scale, GridDefaults::new(Align::Fill, Align::Center, true, false)),
    (Kind::ProgressBar, GridDefaults::new(Align::Fill, Align::Center, true, false)),
    (Kind::Separator, GridDefaults::new(Align::Fill, Align::Center, true, false)),
    (Kind::TextView, GridDefaults::new(Align::Fill, Align::Fill, true, true)),
    (Kind::Scrolled, GridDefaults::new(Align::Fill, Align::Fill, true, true)),
];

/// Look up the placement defaults for `kind`.
pub fn grid_defaults(kind: Kind) -> GridDefaults {
    GRID_DEFAULTS
        .iter()
        .find(|(k, _)| *k == kind)
        .map_or(GridDefaults::FILL, |(_, defaults)| *defaults)
}

/// Most rows or columns a grid may have: `row + rowspan` and
/// `col + colspan` must not exceed it.
pub const MAX_TRACKS: u32 = i16::MAX as u32 - 1;

/// What to do when two children of one grid cover the same cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Record overlapping placements as given.
    #[default]
    Allow,
    /// Refuse a placement that overlaps another child's cells.
    Reject,
}

/// A child's position inside a grid container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPlacement {
    pub node: NodeId,
    pub row: u32,
    pub col: u32,
    pub rowspan: u32,
    pub colspan: u32,
    pub h_align: Align,
    pub v_align: Align,
    pub h_expand: bool,
    pub v_expand: bool,
}

impl GridPlacement {
    /// A placement using the kind's defaults.
    pub fn new(node: NodeId, kind: Kind, row: u32, col: u32, rowspan: u32, colspan: u32) -> Self {
        let defaults = grid_defaults(kind);
        Self {
            node,
            row,
            col,
            rowspan,
            colspan,
            h_align: defaults.h_align,
            v_align: defaults.v_align,
            h_expand: defaults.h_expand,
            v_expand: defaults.v_expand,
        }
    }

    /// One past the last row covered.
    pub fn row_end(&self) -> u32 {
        self.row.saturating_add(self.rowspan)
    }

    /// One past the last column covered.
    pub fn col_end(&self) -> u32 {
        self.col.saturating_add(self.colspan)
    }

    /// Whether the two placements share at least one cell.
    pub fn overlaps(&self, other: &GridPlacement) -> bool {
        self.row < other.row_end()
            && other.row < self.row_end()
            && self.col < other.col_end()
            && other.col < self.col_end()
    }

    fn directive(&self) -> LayoutDirective {
        LayoutDirective {
            node: self.node,
            row: self.row,
            col: self.col,
            rowspan: self.rowspan,
            colspan: self.colspan,
            h_align: self.h_align,
            v_align: self.v_align,
            h_expand: self.h_expand,
            v_expand: self.v_expand,
        }
    }
}

/// Final positioning of one child, handed to the toolkit on attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDirective {
    pub node: NodeId,
    pub row: u32,
    pub col: u32,
    pub rowspan: u32,
    pub colspan: u32,
    pub h_align: Align,
    pub v_align: Align,
    pub h_expand: bool,
    pub v_expand: bool,
}

/// The result of resolving one grid container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridResolution {
    /// `max(row + rowspan)` over all directives.
    pub rows: u32,
    /// `max(col + colspan)` over all directives.
    pub columns: u32,
    /// One directive per child, in child order.
    pub directives: Vec<LayoutDirective>,
}

impl GridResolution {
    /// The directive for `node`, if it is a child of the resolved grid.
    pub fn directive(&self, node: NodeId) -> Option<&LayoutDirective> {
        self.directives.iter().find(|d| d.node == node)
    }
}

/// Identifies one placement: a child inside a specific container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementId {
    pub container: NodeId,
    pub node: NodeId,
}

/// Placement table for every grid container.
#[derive(Debug, Default)]
pub struct GridLayout {
    placements: SecondaryMap<NodeId, Vec<GridPlacement>>,
    overlap_policy: OverlapPolicy,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlap_policy(policy: OverlapPolicy) -> Self {
        Self {
            placements: SecondaryMap::new(),
            overlap_policy: policy,
        }
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy
    }

    /// Record (or replace) the placement of `placement.node` inside
    /// `container`.
    ///
    /// A placement beyond the current extent simply grows the grid, up to
    /// [`MAX_TRACKS`]. See [`check`](Self::check) for what is refused.
    pub fn place(&mut self, container: NodeId, placement: GridPlacement) -> Result<PlacementId> {
        self.check(container, &placement)?;

        if !self.placements.contains_key(container) {
            self.placements.insert(container, Vec::new());
        }
        if let Some(list) = self.placements.get_mut(container) {
            match list.iter_mut().find(|p| p.node == placement.node) {
                Some(existing) => *existing = placement,
                None => list.push(placement),
            }
        }
        tracing::debug!(
            row = placement.row,
            col = placement.col,
            rowspan = placement.rowspan,
            colspan = placement.colspan,
            "placed grid child"
        );
        Ok(PlacementId {
            container,
            node: placement.node,
        })
    }

    /// The recorded placement, if any.
    pub fn placement(&self, id: PlacementId) -> Option<&GridPlacement> {
        self.placements
            .get(id.container)?
            .iter()
            .find(|p| p.node == id.node)
    }

    fn placement_mut(&mut self, id: PlacementId) -> Result<&mut GridPlacement> {
        self.placements
            .get_mut(id.container)
            .and_then(|list| list.iter_mut().find(|p| p.node == id.node))
            .ok_or(Error::UnknownNode)
    }

    /// All placements recorded for `container`, in placement order.
    pub fn placements(&self, container: NodeId) -> &[GridPlacement] {
        self.placements
            .get(container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Set horizontal and vertical alignment.
    pub fn align(&mut self, id: PlacementId, h_align: Align, v_align: Align) -> Result<()> {
        let placement = self.placement_mut(id)?;
        placement.h_align = h_align;
        placement.v_align = v_align;
        Ok(())
    }

    /// Set horizontal and vertical expansion.
    pub fn expand(&mut self, id: PlacementId, h_expand: bool, v_expand: bool) -> Result<()> {
        let placement = self.placement_mut(id)?;
        placement.h_expand = h_expand;
        placement.v_expand = v_expand;
        Ok(())
    }

    /// Change the spans of an existing placement.
    pub fn span(&mut self, id: PlacementId, rowspan: u32, colspan: u32) -> Result<()> {
        let mut updated = *self.placement_mut(id)?;
        updated.rowspan = rowspan;
        updated.colspan = colspan;
        self.place(id.container, updated).map(|_| ())
    }

    /// Resolve `container` into directives, in the container's child order.
    ///
    /// Children without a recorded placement are stacked in column 0 below
    /// the placed ones, one row each, using their kind's defaults.
    pub fn resolve(&self, container: NodeId, dom: &Dom) -> GridResolution {
        let recorded = self.placements(container);
        let mut rows = recorded.iter().map(GridPlacement::row_end).max().unwrap_or(0);
        let mut columns = recorded.iter().map(GridPlacement::col_end).max().unwrap_or(0);

        let mut directives = Vec::new();
        for &child in dom.children(container) {
            let directive = match recorded.iter().find(|p| p.node == child) {
                Some(placement) => placement.directive(),
                None => {
                    let kind = dom.get(child).map_or(Kind::Label, |data| data.kind);
                    let auto = GridPlacement::new(child, kind, rows, 0, 1, 1);
                    rows = auto.row_end();
                    columns = columns.max(auto.col_end());
                    auto.directive()
                }
            };
            directives.push(directive);
        }

        GridResolution {
            rows,
            columns,
            directives,
        }
    }

    /// Drop every placement.
    pub fn clear(&mut self) {
        self.placements.clear();
    }

    /// Validate `placement` without recording it: spans must be at least 1,
    /// the covered area must end within [`MAX_TRACKS`], and under
    /// [`OverlapPolicy::Reject`] it must not share cells with another child.
    pub fn check(&self, container: NodeId, placement: &GridPlacement) -> Result<()> {
        if placement.rowspan == 0 || placement.colspan == 0 {
            return Err(Error::configuration(Kind::Grid, "spans must be at least 1"));
        }
        let in_range = |start: u32, len: u32| start.checked_add(len).is_some_and(|end| end <= MAX_TRACKS);
        if !in_range(placement.row, placement.rowspan) || !in_range(placement.col, placement.colspan) {
            return Err(Error::configuration(
                Kind::Grid,
                format!(
                    "cell ({}, {}) spanning {}x{} exceeds {MAX_TRACKS} tracks",
                    placement.row, placement.col, placement.rowspan, placement.colspan
                ),
            ));
        }
        self.check_overlap(container, placement)
    }

    fn check_overlap(&self, container: NodeId, placement: &GridPlacement) -> Result<()> {
        if self.overlap_policy == OverlapPolicy::Allow {
            return Ok(());
        }
        let clash = self
            .placements(container)
            .iter()
            .filter(|p| p.node != placement.node)
            .any(|p| p.overlaps(placement));
        if clash {
            return Err(Error::Overlap {
                row: placement.row,
                col: placement.col,
            });
        }
        Ok(())
    }
}
