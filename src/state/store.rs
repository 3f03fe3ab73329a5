//! StateStore: path-addressed nested values with synchronous watchers.
//!
//! The store is a cheap, clonable handle over a single-threaded runtime
//! (`Rc<RefCell<..>>`), the same shape as a thread-local reactive runtime
//! but owned by whoever created it. Every clone sees the same data and the
//! same watchers.
//!
//! Notification is synchronous: `set` returns only after every watcher on
//! that exact path has run. Watcher lists are snapshotted before invocation,
//! so watchers may freely call back into the store (including `watch`,
//! `unwatch`, and `set`). Nesting is bounded by [`StoreConfig::max_depth`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::path::Path;
use crate::error::{Error, Result};

/// Mapping type used for nested state.
pub type Map = serde_json::Map<String, Value>;

/// A watcher callback: `(new_value, previous_value)`.
///
/// `previous_value` is `None` when the path held nothing before the write.
pub type WatchFn = dyn Fn(&Value, Option<&Value>) -> Result<()>;

/// Identifies a registered watcher so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

/// Store tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum nesting of watcher notifications before `set` fails with
    /// [`Error::WatcherDepth`].
    pub max_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

struct Watcher {
    id: WatchId,
    callback: Rc<WatchFn>,
}

struct Inner {
    data: Map,
    watchers: HashMap<String, Vec<Watcher>>,
    next_watch_id: u64,
    /// Number of notification passes currently on the stack.
    depth: usize,
    config: StoreConfig,
}

impl Inner {
    fn new(config: StoreConfig) -> Self {
        Self {
            data: Map::new(),
            watchers: HashMap::new(),
            next_watch_id: 0,
            depth: 0,
            config,
        }
    }
}

/// Path-addressed reactive state container.
#[derive(Clone)]
pub struct StateStore {
    inner: Rc<RefCell<Inner>>,
}

impl StateStore {
    /// Create an empty store with default limits.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given limits.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::new(config))),
        }
    }

    /// The store's limits.
    pub fn config(&self) -> StoreConfig {
        self.inner.borrow().config
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Read the value at `path`, or `None` if any segment is missing.
    ///
    /// Malformed paths read as missing.
    pub fn get(&self, path: &str) -> Option<Value> {
        let path = Path::parse(path).ok()?;
        let inner = self.inner.borrow();
        lookup(&inner.data, path.segments()).cloned()
    }

    /// Read the value at `path`, falling back to `default` when missing.
    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> Value {
        self.get(path).unwrap_or_else(|| default.into())
    }

    /// Whether a value (including an explicit `null`) is stored at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// A full copy of the current state tree.
    pub fn dump(&self) -> Map {
        self.inner.borrow().data.clone()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Write `value` at `path`, creating missing intermediate mappings, then
    /// notify the watchers of that exact path in registration order.
    ///
    /// A watcher error stops the remaining watchers and is returned here.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        let path = Path::parse(path)?;
        self.set_parsed(&path, value.into())
    }

    fn set_parsed(&self, path: &Path, value: Value) -> Result<()> {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            write_leaf(&mut inner.data, path, value.clone())?
        };
        self.notify(path.as_str(), &value, previous.as_ref())
    }

    /// Call [`set`](Self::set) once per top-level key of `values`.
    ///
    /// Each key notifies independently; there is no batching. Stops at the
    /// first error.
    pub fn update(&self, values: Map) -> Result<()> {
        for (key, value) in values {
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// Remove the value at `path` and return it.
    ///
    /// Deleting does not notify watchers, not even those on `path` itself.
    /// Enclosing mappings are kept, even when they become empty.
    pub fn delete(&self, path: &str) -> Option<Value> {
        let path = Path::parse(path).ok()?;
        let mut inner = self.inner.borrow_mut();
        let (leaf, parents) = path.segments().split_last()?;
        let parent = if parents.is_empty() {
            &mut inner.data
        } else {
            lookup_mut(&mut inner.data, parents)?.as_object_mut()?
        };
        let removed = parent.remove(leaf);
        if removed.is_some() {
            tracing::trace!(path = %path, "deleted state value");
        }
        removed
    }

    /// Write a leaf and keep every enclosing mapping's watchers consistent.
    ///
    /// The leaf is written with [`set`](Self::set) semantics, then watchers of
    /// each ancestor path (nearest first) receive the merged ancestor mapping
    /// together with the ancestor as it was before the write. This is the
    /// write-back used by two-way bindings.
    pub fn write_through(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        let path = Path::parse(path)?;
        let watched: Vec<(Path, Option<Value>)> = path
            .ancestors()
            .into_iter()
            .filter(|ancestor| self.watcher_count(ancestor.as_str()) > 0)
            .map(|ancestor| {
                let before = self.get(ancestor.as_str());
                (ancestor, before)
            })
            .collect();

        self.set_parsed(&path, value.into())?;

        for (ancestor, before) in watched {
            if let Some(merged) = self.get(ancestor.as_str()) {
                self.notify(ancestor.as_str(), &merged, before.as_ref())?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Watchers
    // -----------------------------------------------------------------------

    /// Register `callback` for writes to exactly `path`.
    pub fn watch(
        &self,
        path: &str,
        callback: impl Fn(&Value, Option<&Value>) -> Result<()> + 'static,
    ) -> Result<WatchId> {
        let path = Path::parse(path)?;
        let mut inner = self.inner.borrow_mut();
        let id = WatchId(inner.next_watch_id);
        inner.next_watch_id += 1;
        inner
            .watchers
            .entry(path.as_str().to_owned())
            .or_default()
            .push(Watcher {
                id,
                callback: Rc::new(callback),
            });
        tracing::trace!(path = %path, ?id, "registered watcher");
        Ok(id)
    }

    /// Remove a watcher. Returns `false` if it was not registered.
    pub fn unwatch(&self, id: WatchId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let mut removed = false;
        inner.watchers.retain(|_, list| {
            let before = list.len();
            list.retain(|w| w.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Number of watchers registered on exactly `path`.
    pub fn watcher_count(&self, path: &str) -> usize {
        self.inner
            .borrow()
            .watchers
            .get(path)
            .map_or(0, Vec::len)
    }

    /// Drop all data and all watchers.
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.data.clear();
        inner.watchers.clear();
        inner.depth = 0;
    }

    fn notify(&self, path: &str, new: &Value, old: Option<&Value>) -> Result<()> {
        let callbacks: Vec<Rc<WatchFn>> = {
            let mut inner = self.inner.borrow_mut();
            let callbacks: Vec<Rc<WatchFn>> = match inner.watchers.get(path) {
                Some(list) => list.iter().map(|w| Rc::clone(&w.callback)).collect(),
                None => return Ok(()),
            };
            if inner.depth >= inner.config.max_depth {
                return Err(Error::WatcherDepth {
                    path: path.to_owned(),
                    limit: inner.config.max_depth,
                });
            }
            inner.depth += 1;
            callbacks
        };

        tracing::trace!(path, watchers = callbacks.len(), "notifying watchers");
        let result = callbacks.iter().try_for_each(|callback| callback(new, old));
        self.inner.borrow_mut().depth -= 1;
        result
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StateStore")
            .field("data", &inner.data)
            .field("watched_paths", &inner.watchers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tree navigation
// ---------------------------------------------------------------------------

fn lookup<'a>(data: &'a Map, segments: &[String]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = data.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn lookup_mut<'a>(data: &'a mut Map, segments: &[String]) -> Option<&'a mut Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = data.get_mut(first)?;
    for segment in rest {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Insert `value` at `path`, returning what was there before.
///
/// Missing or `null` intermediates become empty mappings; any other
/// non-mapping intermediate is a [`Error::PathConflict`].
fn write_leaf(data: &mut Map, path: &Path, value: Value) -> Result<Option<Value>> {
    let segments = path.segments();
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(Error::binding(path.as_str(), "path is empty"));
    };

    let mut current = data;
    for (index, segment) in parents.iter().enumerate() {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if entry.is_null() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(Error::PathConflict {
                    path: path.to_string(),
                    segment: segments[..=index].join("."),
                })
            }
        };
    }
    Ok(current.insert(leaf.clone(), value))
}
