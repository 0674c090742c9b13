//! The impact index: reverse dependencies, built once per schema.

use std::collections::HashMap;

use canopy_core::SchemaNodeId;
use canopy_eval::{EvalContext, Evaluator};
use canopy_schema::Schema;
use canopy_tree::{DataTree, NodeIndex};
use canopy_xpath::LocationPath;
use tracing::trace;

use crate::extract::referenced_paths;

/// One constraint that may be affected by a change at some schema node.
#[derive(Debug, Clone)]
pub struct ConstraintRef {
    /// The schema node the constraint is attached to.
    pub owner: SchemaNodeId,
    /// Index into the owner's constraint list.
    pub index: usize,
    /// The location paths of this constraint that land on the mapped
    /// target node, as written; used to narrow impacted instances.
    paths: Vec<LocationPath>,
}

/// A concrete instance whose constraint must be re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Impacted {
    pub node: NodeIndex,
    pub owner: SchemaNodeId,
    pub constraint_index: usize,
}

/// Static reverse-dependency map: schema node -> constraints that read it.
#[derive(Debug, Default)]
pub struct ImpactIndex {
    entries: HashMap<SchemaNodeId, Vec<ConstraintRef>>,
}

impl ImpactIndex {
    /// Build the index by statically analyzing every constraint of the
    /// schema: when, must and leafref target paths, including paths
    /// inside predicates and function arguments.
    pub fn build(schema: &Schema) -> Self {
        let mut entries: HashMap<SchemaNodeId, Vec<ConstraintRef>> = HashMap::new();
        for node in schema.nodes() {
            for (index, constraint) in node.constraints.iter().enumerate() {
                let expr = match &constraint.expr {
                    Some(expr) => expr,
                    None => continue,
                };
                let mut by_target: HashMap<SchemaNodeId, Vec<LocationPath>> = HashMap::new();
                for reference in referenced_paths(schema, node.id, expr) {
                    by_target
                        .entry(reference.target)
                        .or_default()
                        .push(reference.path);
                }
                for (target, paths) in by_target {
                    entries.entry(target).or_default().push(ConstraintRef {
                        owner: node.id,
                        index,
                        paths,
                    });
                }
            }
        }
        Self { entries }
    }

    /// Constraints that may depend on a change at `target`.
    pub fn constraints_on(&self, target: SchemaNodeId) -> &[ConstraintRef] {
        self.entries.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct schema nodes any constraint depends on. The
    /// orchestrator uses this as its pass bound.
    pub fn covered_nodes(&self) -> usize {
        self.entries.len()
    }

    /// Expand one concrete change into the impacted existing instances,
    /// in document traversal order per constraint.
    ///
    /// `changed_instance` is the live node for creations and value
    /// changes, `None` for a deletion (the instance is already gone).
    ///
    /// Narrowing applies to live changes only: an owner instance is kept
    /// when one of the referencing paths, re-resolved with that instance
    /// as `current()`, either includes the changed node or resolves to
    /// nothing (a reference that stopped resolving is exactly what must
    /// be re-checked). A deletion may have removed any part of the
    /// pre-delete resolution, so every owner of a constraint on the
    /// deleted schema node is re-checked; a path re-resolving to a
    /// surviving sibling says nothing about the instance that is gone.
    /// When several instances violate simultaneously, whichever comes
    /// first in this order is the one reported - an implementation-
    /// defined tie-break, not a guarantee.
    pub fn resolve(
        &self,
        schema: &Schema,
        tree: &DataTree,
        changed_schema: SchemaNodeId,
        changed_instance: Option<NodeIndex>,
    ) -> Vec<Impacted> {
        let evaluator = Evaluator::new(schema);
        let mut out = Vec::new();
        for reference in self.constraints_on(changed_schema) {
            for instance in tree.instances_of(reference.owner) {
                let relevant = match changed_instance {
                    Some(changed) => {
                        self.is_relevant(&evaluator, tree, reference, instance, changed)
                    }
                    None => true,
                };
                if relevant {
                    let impacted = Impacted {
                        node: instance,
                        owner: reference.owner,
                        constraint_index: reference.index,
                    };
                    if !out.contains(&impacted) {
                        out.push(impacted);
                    }
                }
            }
        }
        trace!(
            changed = %changed_schema,
            impacted = out.len(),
            "impact expansion"
        );
        out
    }

    fn is_relevant(
        &self,
        evaluator: &Evaluator<'_>,
        tree: &DataTree,
        reference: &ConstraintRef,
        instance: NodeIndex,
        changed: NodeIndex,
    ) -> bool {
        let ctx = EvalContext::new(tree, instance);
        for path in &reference.paths {
            match evaluator.resolve_path(path, &ctx) {
                Ok(nodes) => {
                    // A reference that stopped resolving is exactly what
                    // must be re-checked.
                    if nodes.is_empty() || nodes.contains(&changed) {
                        return true;
                    }
                }
                // An expression defect surfaces when the constraint is
                // actually evaluated; treat the instance as impacted.
                Err(_) => return true,
            }
        }
        false
    }
}
