//! Paths addressing nodes inside a configuration tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a [`ConfigPath`]: a mapping key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A key into a mapping.
    Key(String),
    /// A position in a list.
    Index(usize),
}

impl PathSegment {
    /// Returns the key, if this segment is one.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    /// Returns true for keys starting with an underscore.
    ///
    /// Such keys hold column values or attached parameters and never get a
    /// row of their own.
    pub fn is_private(&self) -> bool {
        self.as_key().is_some_and(|key| key.starts_with('_'))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// An ordered sequence of segments from the root of a configuration tree to
/// a node (inclusive).
///
/// Paths are the only addressing scheme that survives outside a model; row
/// and column numbers are presentation details.
///
/// # Example
///
/// ```
/// use paramtree::config::ConfigPath;
///
/// let path = ConfigPath::from(["detectors", "panel_0", "tilt", "_value"]);
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.last_key(), Some("_value"));
/// assert_eq!(path.to_string(), "[detectors, panel_0, tilt, _value]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigPath(Vec<PathSegment>);

impl ConfigPath {
    /// Creates the empty (root) path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a segment in place.
    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: impl Into<PathSegment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Returns the path without its last segment, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    /// Returns the last segment.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Returns the last segment if it is a key.
    pub fn last_key(&self) -> Option<&str> {
        self.last().and_then(PathSegment::as_key)
    }

    /// Replaces the last segment with `key`.
    ///
    /// `[a, b, _value].sibling("_min")` is `[a, b, _min]`. The root path has
    /// no siblings and yields `[key]`.
    pub fn sibling(&self, key: impl Into<PathSegment>) -> Self {
        self.parent().unwrap_or_default().join(key)
    }

    /// Returns true if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &ConfigPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{segment}")?;
        }
        write!(f, "]")
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for ConfigPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<PathSegment>, const N: usize> From<[S; N]> for ConfigPath {
    fn from(segments: [S; N]) -> Self {
        segments.into_iter().collect()
    }
}

impl From<Vec<PathSegment>> for ConfigPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}
