//! Instance paths: absolute addresses of concrete nodes in the data tree.
//!
//! A path is a sequence of schema-node steps; list steps additionally carry
//! the key values of the entry they select, so the rendered form matches
//! the protocol's error-path convention:
//! `/if:interfaces/interface[name='eth0']/mtu`.

use crate::SchemaNodeId;

/// One step of an instance path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// The schema node this step selects.
    pub node: SchemaNodeId,
    /// Key (leaf name, value) pairs for list entries; empty otherwise.
    /// For leaf-list entries this is a single ("." , value) pair.
    pub keys: Vec<(String, String)>,
}

impl PathSegment {
    /// A step without key predicates.
    pub fn new(node: SchemaNodeId) -> Self {
        Self {
            node,
            keys: Vec::new(),
        }
    }

    /// A list-entry step with key predicates.
    pub fn with_keys(node: SchemaNodeId, keys: Vec<(String, String)>) -> Self {
        Self { node, keys }
    }
}

/// Absolute path to one concrete instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// The empty (root) path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// The steps of this path, root first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a step, returning the extended path.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// True if `other` addresses this node or a descendant of it.
    pub fn contains(&self, other: &InstancePath) -> bool {
        other.segments.len() >= self.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }

    /// Render the path with a caller-supplied name lookup.
    ///
    /// `name_of` must return the node's name, module-qualified where the
    /// protocol requires it (top-level nodes and module boundaries).
    pub fn render<F>(&self, name_of: F) -> String
    where
        F: Fn(SchemaNodeId) -> String,
    {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for seg in &self.segments {
            out.push('/');
            out.push_str(&name_of(seg.node));
            for (key, value) in &seg.keys {
                if key == "." {
                    out.push_str(&format!("[.='{}']", value));
                } else {
                    out.push_str(&format!("[{}='{}']", key, value));
                }
            }
        }
        out
    }
}
