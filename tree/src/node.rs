//! The model node tree.

use std::fmt;

use canopy_core::{InstancePath, PathSegment, SchemaNodeId};
use canopy_schema::{NodeKind, Schema};

/// Index of a node within one `DataTree`. Indices are never reused inside
/// a request, so a held index either resolves to its node or to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One instantiated node.
#[derive(Debug, Clone)]
pub struct DataNode {
    pub schema: SchemaNodeId,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    /// Leaf / leaf-list entry value, stored as text.
    pub value: Option<String>,
}

/// Arena-backed configuration tree.
#[derive(Debug, Clone, Default)]
pub struct DataTree {
    slots: Vec<Option<DataNode>>,
    roots: Vec<NodeIndex>,
}

impl DataTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node, if the index is live.
    pub fn node(&self, index: NodeIndex) -> Option<&DataNode> {
        self.slots.get(index.raw() as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, index: NodeIndex) -> Option<&mut DataNode> {
        self.slots
            .get_mut(index.raw() as usize)
            .and_then(Option::as_mut)
    }

    /// True if the index refers to a live node.
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.node(index).is_some()
    }

    /// Top-level instances, in document order.
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Children of a node, in document order.
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.node(index).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Leaf value as text.
    pub fn value(&self, index: NodeIndex) -> Option<&str> {
        self.node(index).and_then(|n| n.value.as_deref())
    }

    /// Schema node of an instance.
    pub fn schema_of(&self, index: NodeIndex) -> Option<SchemaNodeId> {
        self.node(index).map(|n| n.schema)
    }

    /// Append a node under `parent` (or as a root).
    pub fn add(
        &mut self,
        parent: Option<NodeIndex>,
        schema: SchemaNodeId,
        value: Option<String>,
    ) -> NodeIndex {
        let index = NodeIndex::new(self.slots.len() as u32);
        self.slots.push(Some(DataNode {
            schema,
            parent,
            children: Vec::new(),
            value,
        }));
        match parent {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.children.push(index);
                }
            }
            None => self.roots.push(index),
        }
        index
    }

    /// Overwrite a leaf value. Returns true if the value changed.
    pub fn set_value(&mut self, index: NodeIndex, value: Option<String>) -> bool {
        match self.node_mut(index) {
            Some(node) if node.value != value => {
                node.value = value;
                true
            }
            _ => false,
        }
    }

    /// Remove a node and its whole subtree.
    pub fn remove_subtree(&mut self, index: NodeIndex) {
        let parent = match self.node(index) {
            Some(n) => n.parent,
            None => return,
        };
        match parent {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.children.retain(|&c| c != index);
                }
            }
            None => self.roots.retain(|&r| r != index),
        }
        let mut stack = vec![index];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.slots[idx.raw() as usize].take() {
                stack.extend(node.children);
            }
        }
    }

    /// All live nodes in document (preorder) order.
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.node(idx) {
                out.push(idx);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Live descendants of a node, preorder, including the node itself.
    pub fn descendants(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![index];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.node(idx) {
                out.push(idx);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// All instances of one schema node, in document order.
    pub fn instances_of(&self, schema: SchemaNodeId) -> Vec<NodeIndex> {
        self.preorder()
            .into_iter()
            .filter(|&idx| self.schema_of(idx) == Some(schema))
            .collect()
    }

    /// Key (name, value) pairs identifying a list entry or leaf-list
    /// entry; empty for other kinds.
    pub fn key_values(&self, schema: &Schema, index: NodeIndex) -> Vec<(String, String)> {
        let node = match self.node(index) {
            Some(n) => n,
            None => return Vec::new(),
        };
        match &schema.node(node.schema).kind {
            NodeKind::List { keys } => keys
                .iter()
                .filter_map(|key| {
                    let key_schema = schema.child_by_name(node.schema, key)?;
                    let child = node
                        .children
                        .iter()
                        .find(|&&c| self.schema_of(c) == Some(key_schema))?;
                    Some((key.clone(), self.value(*child).unwrap_or("").to_string()))
                })
                .collect(),
            NodeKind::LeafList => {
                vec![(".".to_string(), node.value.clone().unwrap_or_default())]
            }
            _ => Vec::new(),
        }
    }

    /// Absolute instance path of a node.
    pub fn path_of(&self, schema: &Schema, index: NodeIndex) -> InstancePath {
        let mut segments = Vec::new();
        let mut cursor = Some(index);
        while let Some(idx) = cursor {
            let node = match self.node(idx) {
                Some(n) => n,
                None => break,
            };
            segments.push(PathSegment::with_keys(
                node.schema,
                self.key_values(schema, idx),
            ));
            cursor = node.parent;
        }
        segments.reverse();
        InstancePath::from_segments(segments)
    }

    /// Find a direct child instance of `parent` (or a root) for a schema
    /// node, disambiguated by list keys or leaf-list value.
    pub fn find_child(
        &self,
        schema: &Schema,
        parent: Option<NodeIndex>,
        child_schema: SchemaNodeId,
        keys: &[(String, String)],
        value: Option<&str>,
    ) -> Option<NodeIndex> {
        let candidates: Vec<NodeIndex> = match parent {
            Some(p) => self.children(p).to_vec(),
            None => self.roots.clone(),
        };
        let kind = &schema.node(child_schema).kind;
        candidates.into_iter().find(|&idx| {
            if self.schema_of(idx) != Some(child_schema) {
                return false;
            }
            match kind {
                NodeKind::List { .. } => {
                    let have = self.key_values(schema, idx);
                    keys.iter()
                        .all(|(k, v)| have.iter().any(|(hk, hv)| hk == k && hv == v))
                }
                NodeKind::LeafList => self.value(idx) == value,
                _ => true,
            }
        })
    }

    /// Resolve an instance path from the root.
    pub fn find_by_path(&self, schema: &Schema, path: &InstancePath) -> Option<NodeIndex> {
        let mut parent: Option<NodeIndex> = None;
        for segment in path.segments() {
            let value = segment
                .keys
                .iter()
                .find(|(k, _)| k == ".")
                .map(|(_, v)| v.as_str());
            parent = Some(self.find_child(schema, parent, segment.node, &segment.keys, value)?);
        }
        parent
    }
}
