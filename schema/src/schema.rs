//! The Schema - immutable schema lookup.

use std::collections::HashMap;

use canopy_core::{ModuleId, SchemaNodeId};

use crate::types::{Constraint, Identity, Module, SchemaNode};

/// The Schema provides runtime lookup of the compiled configuration model.
/// It is immutable after construction.
#[derive(Debug)]
pub struct Schema {
    /// Modules in declaration order; indexed by ModuleId raw value.
    modules: Vec<Module>,
    /// Prefix -> module lookup.
    prefixes: HashMap<String, ModuleId>,
    /// All schema nodes; indexed by SchemaNodeId raw value.
    nodes: Vec<SchemaNode>,
    /// Top-level nodes across all modules, in declaration order.
    roots: Vec<SchemaNodeId>,
    /// Identities by qualified name.
    identities: HashMap<String, Identity>,
}

impl Schema {
    pub(crate) fn new(
        modules: Vec<Module>,
        prefixes: HashMap<String, ModuleId>,
        nodes: Vec<SchemaNode>,
        roots: Vec<SchemaNodeId>,
        identities: HashMap<String, Identity>,
    ) -> Self {
        Self {
            modules,
            prefixes,
            nodes,
            roots,
            identities,
        }
    }

    // ==================== Node Lookups ====================

    /// Get a schema node. Ids handed out by the builder are always valid.
    pub fn node(&self, id: SchemaNodeId) -> &SchemaNode {
        &self.nodes[id.raw() as usize]
    }

    /// Total number of schema nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    /// Top-level schema nodes across all modules.
    pub fn roots(&self) -> &[SchemaNodeId] {
        &self.roots
    }

    /// Constraints attached to a node.
    pub fn constraints(&self, id: SchemaNodeId) -> &[Constraint] {
        &self.node(id).constraints
    }

    // ==================== Modules & Names ====================

    /// Get a module definition.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.raw() as usize]
    }

    /// Resolve an expression prefix to its module.
    pub fn module_by_prefix(&self, prefix: &str) -> Option<ModuleId> {
        self.prefixes.get(prefix).copied()
    }

    /// Resolve one path step: find the child of `parent` (or a top-level
    /// root when `parent` is `None`) matching a possibly-prefixed name.
    ///
    /// An unprefixed top-level name resolves in `ctx_module`, the module
    /// of the expression's context node; nested names match by name alone,
    /// with the prefix (when present) narrowing the module.
    pub fn resolve_child(
        &self,
        parent: Option<SchemaNodeId>,
        prefix: Option<&str>,
        name: &str,
        ctx_module: ModuleId,
    ) -> Option<SchemaNodeId> {
        let module = match prefix {
            Some(p) => Some(self.module_by_prefix(p)?),
            None => None,
        };
        let candidates: &[SchemaNodeId] = match parent {
            Some(p) => &self.node(p).children,
            None => &self.roots,
        };
        candidates
            .iter()
            .copied()
            .find(|&id| {
                let node = self.node(id);
                if node.name != name {
                    return false;
                }
                match module {
                    Some(m) => node.module == m,
                    // Top-level names without a prefix belong to the
                    // context node's own module.
                    None => parent.is_some() || node.module == ctx_module,
                }
            })
    }

    /// Find a direct child by bare name (key leaf lookup).
    pub fn child_by_name(&self, parent: SchemaNodeId, name: &str) -> Option<SchemaNodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&id| self.node(id).name == name)
    }

    /// Name as rendered in error paths: module-prefixed at the top level
    /// and wherever the module changes from the parent's.
    pub fn qualified_name(&self, id: SchemaNodeId) -> String {
        let node = self.node(id);
        let needs_prefix = match node.parent {
            None => true,
            Some(parent) => self.node(parent).module != node.module,
        };
        if needs_prefix {
            format!("{}:{}", self.module(node.module).prefix, node.name)
        } else {
            node.name.clone()
        }
    }

    // ==================== Identities ====================

    /// Get an identity by qualified name.
    pub fn identity(&self, name: &str) -> Option<&Identity> {
        self.identities.get(name)
    }

    /// True if `name` is transitively derived from `base`.
    /// With `or_self`, `name == base` also qualifies.
    pub fn is_derived_from(&self, name: &str, base: &str, or_self: bool) -> bool {
        if or_self && name == base {
            return true;
        }
        let mut stack: Vec<&str> = match self.identities.get(name) {
            Some(identity) => identity.bases.iter().map(String::as_str).collect(),
            None => return false,
        };
        let mut seen: Vec<&str> = Vec::new();
        while let Some(candidate) = stack.pop() {
            if candidate == base {
                return true;
            }
            if seen.contains(&candidate) {
                continue;
            }
            seen.push(candidate);
            if let Some(identity) = self.identities.get(candidate) {
                stack.extend(identity.bases.iter().map(String::as_str));
            }
        }
        false
    }
}
