//! # trellis-ui
//!
//! A declarative UI tree with reactive, path-addressed state and grid layout,
//! for driving a native widget toolkit.
//!
//! trellis-ui does not draw. It builds a typed component tree, keeps control
//! values in sync with a nested state store, resolves grid placements into
//! layout directives, and hands all of it to a [`Toolkit`](toolkit::Toolkit)
//! implementation when the tree is realized.
//!
//! ## Core Systems
//!
//! - **[`state`]**: `StateStore`: nested values addressed by dotted paths, with synchronous watchers
//! - **[`dom`]**: Slotmap-backed node arena, typed per-kind configuration, id registry
//! - **[`builder`]**: Fluent `NodeMut` / `PlacementMut` construction API
//! - **[`binding`]**: Two-way glue between a store path and a control's value
//! - **[`layout`]**: Grid placements, directive resolution, taffy-backed preview
//! - **[`event`]**: Event kinds and per-node handler tables
//! - **[`toolkit`]**: The native toolkit boundary
//! - **[`app`]**: `Ui` context tying everything together
//! - **[`testing`]**: Headless toolkit, Pilot, snapshot helpers
//! - **[`geometry`]**: Size and Region primitives

// Foundation
pub mod error;
pub mod geometry;

// Core systems
pub mod dom;
pub mod layout;
pub mod state;

// Events and binding
pub mod binding;
pub mod event;

// Application
pub mod app;
pub mod builder;
pub mod toolkit;

// Test support
pub mod testing;

pub use app::{Ui, UiConfig};
pub use error::{Error, Result};
