//! Dot-delimited state paths.

use std::fmt;

use crate::error::{Error, Result};

/// A validated, dot-delimited path into the state tree (e.g. `form.username`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    raw: String,
    segments: Vec<String>,
}

impl Path {
    /// Parse a path string.
    ///
    /// Every segment must be non-empty and contain no whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::binding(raw, "path is empty"));
        }
        let mut segments = Vec::new();
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(Error::binding(raw, "empty segment"));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(Error::binding(raw, "segment contains whitespace"));
            }
            segments.push(segment.to_owned());
        }
        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    fn from_segments(segments: &[String]) -> Self {
        Self {
            raw: segments.join("."),
            segments: segments.to_vec(),
        }
    }

    /// The path as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The individual segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment.
    pub fn leaf(&self) -> &str {
        // Parsing guarantees at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The enclosing path, or `None` for a top-level key.
    pub fn parent(&self) -> Option<Path> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self::from_segments(&self.segments[..self.segments.len() - 1]))
    }

    /// All enclosing paths, nearest first.
    pub fn ancestors(&self) -> Vec<Path> {
        (1..self.segments.len())
            .rev()
            .map(|len| Self::from_segments(&self.segments[..len]))
            .collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
