//! Per-request memoization of "does this subtree carry constraints".

use std::collections::HashMap;

use canopy_core::SchemaNodeId;
use canopy_schema::Schema;

/// Memoizes, per (parent schema node, child schema node), whether the
/// child's subtree carries any constraint at all. Validating a list with
/// many entries walks the same child schema once instead of per entry.
/// Owned by one validation context and dropped with it.
#[derive(Debug, Default)]
pub struct ValidatedChildCache {
    memo: HashMap<(SchemaNodeId, SchemaNodeId), bool>,
}

impl ValidatedChildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the child subtree declares at least one constraint.
    pub fn subtree_has_constraints(
        &mut self,
        schema: &Schema,
        parent: SchemaNodeId,
        child: SchemaNodeId,
    ) -> bool {
        if let Some(&cached) = self.memo.get(&(parent, child)) {
            return cached;
        }
        let result = Self::walk(schema, child);
        self.memo.insert((parent, child), result);
        result
    }

    fn walk(schema: &Schema, node: SchemaNodeId) -> bool {
        let def = schema.node(node);
        if !def.constraints.is_empty() {
            return true;
        }
        def.children.iter().any(|&c| Self::walk(schema, c))
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }
}
