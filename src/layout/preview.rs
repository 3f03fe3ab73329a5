//! Dry-run geometry for a resolved grid, computed with taffy.
//!
//! The toolkit lays out real widgets itself; this preview exists so designers
//! and tests can see where each child of a grid would land for a given
//! container size without a native backend. Tracks covered by an expanding
//! child (or all tracks of a homogeneous axis) get `1fr`, the rest `auto`.

use std::collections::HashMap;

use indexmap::IndexMap;
use taffy::geometry::Line;
use taffy::style::{AlignSelf, AvailableSpace, Display, Style};
use taffy::style_helpers::{auto, fr, length, line, span};
use taffy::TaffyTree;

use super::grid::{Align, GridResolution, LayoutDirective};
use crate::dom::kind::Kind;
use crate::dom::node::NodeId;
use crate::error::{Error, Result};
use crate::geometry::{Region, Size};

/// Container-level inputs to a preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewOptions {
    pub row_spacing: u32,
    pub column_spacing: u32,
    pub row_homogeneous: bool,
    pub column_homogeneous: bool,
}

/// A child's requested minimum size; `None` sizes to content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Compute each child's region inside a container of size `available`.
///
/// Regions are relative to the container's origin and returned in directive
/// order.
pub fn preview(
    resolution: &GridResolution,
    options: PreviewOptions,
    requests: &HashMap<NodeId, SizeRequest>,
    available: Size,
) -> Result<IndexMap<NodeId, Region>> {
    let mut tree: TaffyTree<()> = TaffyTree::new();

    let mut leaves = Vec::with_capacity(resolution.directives.len());
    for directive in &resolution.directives {
        let request = requests.get(&directive.node).copied().unwrap_or_default();
        let style = Style {
            grid_row: Line {
                start: line(grid_line(directive.row)?),
                end: span(grid_span(directive.rowspan)?),
            },
            grid_column: Line {
                start: line(grid_line(directive.col)?),
                end: span(grid_span(directive.colspan)?),
            },
            justify_self: Some(self_alignment(directive.h_align)),
            align_self: Some(self_alignment(directive.v_align)),
            size: taffy::geometry::Size {
                width: request.width.map_or(auto(), |w| length(w as f32)),
                height: request.height.map_or(auto(), |h| length(h as f32)),
            },
            ..Default::default()
        };
        leaves.push(tree.new_leaf(style).map_err(layout_error)?);
    }

    let expands_column =
        |i: u32| options.column_homogeneous || covers(&resolution.directives, i, |d| (d.col, d.colspan, d.h_expand));
    let expands_row =
        |i: u32| options.row_homogeneous || covers(&resolution.directives, i, |d| (d.row, d.rowspan, d.v_expand));

    let root_style = Style {
        display: Display::Grid,
        size: taffy::geometry::Size {
            width: length(available.width as f32),
            height: length(available.height as f32),
        },
        gap: taffy::geometry::Size {
            width: length(options.column_spacing as f32),
            height: length(options.row_spacing as f32),
        },
        grid_template_columns: (0..resolution.columns)
            .map(|i| if expands_column(i) { fr(1.0) } else { auto() })
            .collect(),
        grid_template_rows: (0..resolution.rows)
            .map(|i| if expands_row(i) { fr(1.0) } else { auto() })
            .collect(),
        ..Default::default()
    };
    let root = tree
        .new_with_children(root_style, &leaves)
        .map_err(layout_error)?;

    tree.compute_layout(
        root,
        taffy::geometry::Size {
            width: AvailableSpace::Definite(available.width as f32),
            height: AvailableSpace::Definite(available.height as f32),
        },
    )
    .map_err(layout_error)?;

    let mut regions = IndexMap::with_capacity(leaves.len());
    for (directive, leaf) in resolution.directives.iter().zip(leaves) {
        let layout = tree.layout(leaf).map_err(layout_error)?;
        regions.insert(
            directive.node,
            Region::new(
                layout.location.x.round() as i32,
                layout.location.y.round() as i32,
                layout.size.width.round() as i32,
                layout.size.height.round() as i32,
            ),
        );
    }
    Ok(regions)
}

/// Whether any expanding directive covers track `index` on one axis.
fn covers(
    directives: &[LayoutDirective],
    index: u32,
    axis: impl Fn(&LayoutDirective) -> (u32, u32, bool),
) -> bool {
    directives.iter().any(|d| {
        let (start, len, expand) = axis(d);
        expand && start <= index && index < start.saturating_add(len)
    })
}

fn self_alignment(align: Align) -> AlignSelf {
    match align {
        Align::Start => AlignSelf::Start,
        Align::Center => AlignSelf::Center,
        Align::End => AlignSelf::End,
        Align::Fill => AlignSelf::Stretch,
    }
}

/// Grid lines are 1-based.
fn grid_line(index: u32) -> Result<i16> {
    index
        .checked_add(1)
        .and_then(|line| i16::try_from(line).ok())
        .ok_or_else(|| Error::configuration(Kind::Grid, format!("track {index} is out of range")))
}

fn grid_span(len: u32) -> Result<u16> {
    u16::try_from(len)
        .map_err(|_| Error::configuration(Kind::Grid, format!("span {len} is out of range")))
}

fn layout_error(err: taffy::TaffyError) -> Error {
    Error::configuration(Kind::Grid, format!("layout failed: {err}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;
    use crate::layout::grid::{GridLayout, GridPlacement};

    struct Form {
        dom: Dom,
        grid: NodeId,
        label: NodeId,
        entry: NodeId,
        layout: GridLayout,
    }

    /// A two-column form row: a fixed-width label and an expanding entry.
    fn form() -> Form {
        let mut dom = Dom::new();
        let grid = dom.insert(NodeData::new(Kind::Grid));
        let label = dom.insert(NodeData::new(Kind::Label));
        let entry = dom.insert(NodeData::new(Kind::Entry));
        dom.append_child(grid, label).unwrap();
        dom.append_child(grid, entry).unwrap();
        let mut layout = GridLayout::new();
        layout
            .place(grid, GridPlacement::new(label, Kind::Label, 0, 0, 1, 1))
            .unwrap();
        layout
            .place(grid, GridPlacement::new(entry, Kind::Entry, 0, 1, 1, 1))
            .unwrap();
        Form {
            dom,
            grid,
            label,
            entry,
            layout,
        }
    }

    fn label_request(label: NodeId) -> HashMap<NodeId, SizeRequest> {
        HashMap::from([(
            label,
            SizeRequest {
                width: Some(20),
                height: Some(2),
            },
        )])
    }

    #[test]
    fn expanding_column_takes_remaining_width() {
        let f = form();
        let resolution = f.layout.resolve(f.grid, &f.dom);
        let regions = preview(
            &resolution,
            PreviewOptions::default(),
            &label_request(f.label),
            Size::new(100, 10),
        )
        .unwrap();

        let label = regions[&f.label];
        let entry = regions[&f.entry];
        assert_eq!((label.x, label.width), (0, 20));
        assert_eq!((entry.x, entry.width), (20, 80));
    }

    #[test]
    fn column_spacing_becomes_gap() {
        let f = form();
        let resolution = f.layout.resolve(f.grid, &f.dom);
        let options = PreviewOptions {
            column_spacing: 10,
            ..PreviewOptions::default()
        };
        let regions = preview(&resolution, options, &label_request(f.label), Size::new(100, 10)).unwrap();
        assert_eq!((regions[&f.entry].x, regions[&f.entry].width), (30, 70));
    }

    #[test]
    fn homogeneous_columns_split_evenly() {
        let f = form();
        let resolution = f.layout.resolve(f.grid, &f.dom);
        let options = PreviewOptions {
            column_homogeneous: true,
            ..PreviewOptions::default()
        };
        let regions = preview(&resolution, options, &HashMap::new(), Size::new(100, 10)).unwrap();
        assert_eq!(regions[&f.entry].x, 50);
        assert_eq!(regions[&f.entry].width, 50);
    }

    #[test]
    fn regions_follow_directive_order() {
        let f = form();
        let resolution = f.layout.resolve(f.grid, &f.dom);
        let regions = preview(&resolution, PreviewOptions::default(), &HashMap::new(), Size::new(40, 4)).unwrap();
        let order: Vec<NodeId> = regions.keys().copied().collect();
        assert_eq!(order, vec![f.label, f.entry]);
        assert!(regions
            .values()
            .all(|r| r.x >= 0 && r.y >= 0 && r.x + r.width <= 40 && r.y + r.height <= 4));
    }

    #[test]
    fn out_of_range_track_is_an_error() {
        assert!(grid_line(u32::from(u16::MAX)).is_err());
        assert!(grid_line(u32::MAX).is_err());
        assert_eq!(grid_line(0).unwrap(), 1);
        assert!(grid_span(70_000).is_err());
    }
}
