//! Query keys naming cacheable resources.

use serde::{Deserialize, Serialize};

/// Opaque, comparable identifier naming one cached resource.
///
/// A key is an ordered list of string segments; two requests with equal keys
/// share cache state. Segments let callers scope keys hierarchically
/// (`["projects"]`, `["projects", "<id>", "logs"]`) without the cache
/// assigning any meaning to the structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey {
    segments: Vec<String>,
}

impl QueryKey {
    /// Create a key with a single root segment.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            segments: vec![root.into()],
        }
    }

    /// Create a key from an ordered list of segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Builder: append a segment.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
