//! Reactive state: path-addressed values with synchronous change notification.
//!
//! - [`StateStore`]: clonable handle to a nested value tree plus watchers.
//! - [`Path`]: validated dot-delimited address into that tree.

pub mod path;
pub mod store;

pub use path::Path;
pub use store::{Map, StateStore, StoreConfig, WatchFn, WatchId};
pub use serde_json::Value;
