//! The change tree: one request's proposed edit.

use canopy_core::SchemaNodeId;

/// Protocol edit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Upsert: create if absent, update the value if present.
    Merge,
    /// Delete any existing instance, then create from the payload.
    Replace,
    /// Create; an already-existing instance is an error.
    Create,
    /// Delete; a missing instance is an error.
    Delete,
    /// Delete; a missing instance is tolerated.
    Remove,
}

impl EditOp {
    /// True for the two deletion operations.
    pub fn is_deletion(&self) -> bool {
        matches!(self, EditOp::Delete | EditOp::Remove)
    }
}

/// One node of the change tree. Mirrors the target subtree shape: each
/// node names a schema node, the operation to perform there, and (for
/// list entries) the keys selecting the concrete instance.
#[derive(Debug, Clone)]
pub struct ChangeNode {
    pub schema: SchemaNodeId,
    pub op: EditOp,
    /// Leaf / leaf-list entry value.
    pub value: Option<String>,
    /// Key values selecting a list entry.
    pub keys: Vec<(String, String)>,
    pub children: Vec<ChangeNode>,
}

impl ChangeNode {
    pub fn new(schema: SchemaNodeId, op: EditOp) -> Self {
        Self {
            schema,
            op,
            value: None,
            keys: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Merge node (the default protocol operation).
    pub fn merge(schema: SchemaNodeId) -> Self {
        Self::new(schema, EditOp::Merge)
    }

    pub fn create(schema: SchemaNodeId) -> Self {
        Self::new(schema, EditOp::Create)
    }

    pub fn delete(schema: SchemaNodeId) -> Self {
        Self::new(schema, EditOp::Delete)
    }

    pub fn remove(schema: SchemaNodeId) -> Self {
        Self::new(schema, EditOp::Remove)
    }

    pub fn replace(schema: SchemaNodeId) -> Self {
        Self::new(schema, EditOp::Replace)
    }

    /// Set the leaf value.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Select a list entry by key.
    pub fn key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.push((name.into(), value.into()));
        self
    }

    /// Add a child edit.
    pub fn child(mut self, child: ChangeNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A whole edit request: one change node per touched top-level subtree.
#[derive(Debug, Clone, Default)]
pub struct ChangeTree {
    pub edits: Vec<ChangeNode>,
}

impl ChangeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(mut self, node: ChangeNode) -> Self {
        self.edits.push(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
