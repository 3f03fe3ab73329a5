//! Events: kinds, payloads, and per-node handler tables.

pub mod handler;
pub mod message;

pub use handler::{dispatch, HandlerFn, HandlerTable};
pub use message::{Event, EventKind};
