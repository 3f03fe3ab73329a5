//! Error taxonomy shared by the store, the builder, and realization.
//!
//! Lookup misses are never errors: registry and store reads return `Option`.

use crate::dom::kind::Kind;
use crate::toolkit::ToolkitError;

/// Errors raised by trellis-ui operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structural misuse of the builder (e.g. adding a child to a leaf kind).
    #[error("configuration error on {kind}: {message}")]
    Configuration { kind: Kind, message: String },

    /// A malformed state path.
    #[error("invalid path {path:?}: {message}")]
    Binding { path: String, message: String },

    /// The toolkit failed to create a native handle. Never retried.
    #[error("failed to realize {kind}")]
    Realization {
        kind: Kind,
        #[source]
        source: ToolkitError,
    },

    /// A write would descend through a value that is not a mapping.
    #[error("cannot write {path:?}: {segment:?} holds a non-mapping value")]
    PathConflict { path: String, segment: String },

    /// Watcher notifications nested deeper than the configured bound.
    #[error("watcher recursion exceeded depth {limit} while setting {path:?}")]
    WatcherDepth { path: String, limit: usize },

    /// An id was registered twice while strict ids are enabled.
    #[error("id {0:?} is already registered")]
    DuplicateId(String),

    /// Two grid placements cover the same cell while overlaps are rejected.
    #[error("placement at row {row}, column {col} overlaps an existing child")]
    Overlap { row: u32, col: u32 },

    /// A node id that does not (or no longer) exist in the arena.
    #[error("unknown node")]
    UnknownNode,

    /// A toolkit call on an already realized handle failed.
    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
}

impl Error {
    pub(crate) fn configuration(kind: Kind, message: impl Into<String>) -> Self {
        Self::Configuration {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn binding(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Binding {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
