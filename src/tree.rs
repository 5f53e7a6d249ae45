//! In-memory parameter tree model.
//!
//! This module defines the format-agnostic value representation shared by
//! every codec and by the reconciliation engine:
//!
//! - Scalars (null, booleans, integers, floats, strings)
//! - Lists, treated as opaque leaf values for merge purposes
//! - Ordered maps with unique string keys
//!
//! A parameter *document* is a [`ParameterNode::Map`] at the file root.
//! The reconciled parameters live under a configured top-level key
//! (default `"parameters"`); sibling top-level keys are preserved settings.

use indexmap::IndexMap;

/// Default top-level key under which parameters live.
pub const DEFAULT_PARAMETER_KEY: &str = "parameters";

/// Ordered map of parameter names to nodes. Keys are unique.
pub type ParameterMap = IndexMap<String, ParameterNode>;

/// Mapping from current parameter key to its previous name. Applies at
/// the top level of the parameter subtree only.
pub type RenameMap = IndexMap<String, String>;

/// Mapping from parameter dot-path to environment variable name.
pub type EnvMap = IndexMap<String, String>;

/// A node of a parameter tree.
///
/// Lists carry their items but the engine never merges into them: a list
/// behaves exactly like a scalar leaf at its path. Empty collections read
/// from YAML or JSON load as empty maps by convention.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterNode {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    Str(String),
    /// Sequence value, opaque to the merge logic.
    List(Vec<ParameterNode>),
    /// Nested parameter group.
    Map(ParameterMap),
}

impl ParameterNode {
    /// Creates an empty map node.
    #[must_use]
    pub fn empty_map() -> Self {
        Self::Map(ParameterMap::new())
    }

    /// Returns `true` for map nodes.
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// Borrows the inner map, if this node is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&ParameterMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Mutably borrows the inner map, if this node is a map.
    pub fn as_map_mut(&mut self) -> Option<&mut ParameterMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a node by dot-joined path relative to this node.
    ///
    /// Returns `None` when any segment is missing or crosses a leaf.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Self> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets a value at a dot-joined path relative to this node,
    /// overwriting whatever was there.
    ///
    /// Intermediate maps are created as needed; a non-map value standing
    /// at an intermediate segment is replaced by a map. Has no effect when
    /// called on a non-map node.
    pub fn set_path(&mut self, path: &str, value: Self) {
        let Some(mut map) = self.as_map_mut() else {
            return;
        };

        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                map.insert(segment.to_string(), value);
                return;
            }

            let current: &mut ParameterMap = map;
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(Self::empty_map);
            if !entry.is_map() {
                *entry = Self::empty_map();
            }
            // The entry was just forced to be a map.
            let Some(next) = entry.as_map_mut() else {
                return;
            };
            map = next;
        }
    }
}

impl From<&str> for ParameterNode {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParameterNode {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParameterNode {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ParameterNode {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> ParameterNode {
        let mut database = ParameterMap::new();
        database.insert(String::from("host"), ParameterNode::from("localhost"));
        database.insert(String::from("port"), ParameterNode::Int(5432));

        let mut root = ParameterMap::new();
        root.insert(String::from("database"), ParameterNode::Map(database));
        root.insert(String::from("debug"), ParameterNode::Bool(false));
        ParameterNode::Map(root)
    }

    #[test]
    fn test_get_path_nested() {
        let doc = sample_doc();
        assert_eq!(
            doc.get_path("database.host"),
            Some(&ParameterNode::from("localhost"))
        );
        assert_eq!(doc.get_path("database.port"), Some(&ParameterNode::Int(5432)));
    }

    #[test]
    fn test_get_path_missing_segment() {
        let doc = sample_doc();
        assert_eq!(doc.get_path("database.user"), None);
        assert_eq!(doc.get_path("cache.ttl"), None);
    }

    #[test]
    fn test_get_path_through_leaf_is_none() {
        let doc = sample_doc();
        assert_eq!(doc.get_path("debug.enabled"), None);
    }

    #[test]
    fn test_set_path_overwrites_leaf() {
        let mut doc = sample_doc();
        doc.set_path("database.port", ParameterNode::Int(6543));
        assert_eq!(doc.get_path("database.port"), Some(&ParameterNode::Int(6543)));
    }

    #[test]
    fn test_set_path_creates_intermediate_maps() {
        let mut doc = sample_doc();
        doc.set_path("cache.redis.ttl", ParameterNode::Int(60));
        assert_eq!(
            doc.get_path("cache.redis.ttl"),
            Some(&ParameterNode::Int(60))
        );
    }

    #[test]
    fn test_set_path_replaces_leaf_intermediate() {
        let mut doc = sample_doc();
        doc.set_path("debug.level", ParameterNode::Int(3));
        assert_eq!(doc.get_path("debug.level"), Some(&ParameterNode::Int(3)));
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let doc = sample_doc();
        let keys: Vec<&str> = doc
            .as_map()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["database", "debug"]);
    }
}
