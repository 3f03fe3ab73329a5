//! Headless testing support: an in-memory toolkit, a Pilot, snapshot helpers.
//!
//! Use [`HeadlessToolkit`] as the toolkit of a [`Ui`](crate::app::Ui) to
//! realize trees without a native backend, the [`Pilot`] to simulate user
//! input against it, and [`tree_to_string`] to capture a tree as plain text for
//! snapshot assertions.

pub mod headless;
pub mod pilot;
pub mod snapshot;

pub use headless::{Attachment, HeadlessToolkit, HeadlessWidget};
pub use pilot::Pilot;
pub use snapshot::tree_to_string;
