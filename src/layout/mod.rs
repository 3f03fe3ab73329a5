//! Grid layout: placement records, directive resolution, and a taffy-backed
//! geometry preview.
//!
//! - [`grid`]: per-container [`GridPlacement`] table and [`GridLayout::resolve`]
//! - [`preview`]: concrete cell rectangles for a resolved grid

pub mod grid;
pub mod preview;

pub use grid::{
    grid_defaults, Align, GridDefaults, GridLayout, GridPlacement, GridResolution,
    LayoutDirective, OverlapPolicy, PlacementId, MAX_TRACKS,
};
pub use preview::{preview, PreviewOptions, SizeRequest};
