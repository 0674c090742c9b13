//! Constraint dispatch: one instance, one constraint, one outcome.

use canopy_eval::{EvalError, Evaluator};
use canopy_schema::{Constraint, ConstraintKind, Schema};
use canopy_tree::{DataTree, NodeIndex};

use crate::checks;
use crate::report::{ErrorRecord, ErrorTag, Reporter};

/// Result of checking one constraint on one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass,
    /// The node's when condition is false. Whether this is a hard
    /// violation or a silent implicit removal depends on how the node
    /// got into the tree, which only the orchestrator knows.
    WhenFalse,
    Violation(ErrorRecord),
}

impl CheckOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckOutcome::Pass)
    }
}

/// Evaluates the constraints of a candidate tree.
pub struct Checker<'s, 't> {
    pub(crate) schema: &'s Schema,
    pub(crate) evaluator: Evaluator<'s>,
    pub(crate) reporter: Reporter<'s>,
    pub(crate) tree: &'t DataTree,
}

impl<'s, 't> Checker<'s, 't> {
    pub fn new(schema: &'s Schema, tree: &'t DataTree) -> Self {
        Self {
            schema,
            evaluator: Evaluator::new(schema),
            reporter: Reporter::new(schema),
            tree,
        }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Check one constraint of `node`, identified by its position in the
    /// owning schema node's constraint list.
    pub fn check(&self, node: NodeIndex, constraint_index: usize) -> CheckOutcome {
        let schema_id = match self.tree.schema_of(node) {
            Some(id) => id,
            // The instance was removed by an earlier synthetic edit.
            None => return CheckOutcome::Pass,
        };
        let constraint = match self.schema.node(schema_id).constraints.get(constraint_index) {
            Some(c) => c,
            None => return CheckOutcome::Pass,
        };
        match &constraint.kind {
            ConstraintKind::When => checks::when::check(self, node, constraint),
            ConstraintKind::Must => checks::must::check(self, node, constraint),
            ConstraintKind::Leafref { require_instance } => {
                checks::leafref::check(self, node, constraint, *require_instance)
            }
            ConstraintKind::Unique { leafs } => checks::unique::check(self, node, leafs),
            ConstraintKind::Identity { base } => checks::identity::check(self, node, base),
            ConstraintKind::InstanceIdentifier { require_instance } => {
                checks::instance_id::check(self, node, *require_instance)
            }
            ConstraintKind::Range { min, max } => {
                checks::bounds::check_range(self, node, constraint, *min, *max)
            }
            ConstraintKind::Pattern { regex } => {
                checks::bounds::check_pattern(self, node, constraint, regex)
            }
            // Mandatory is structural: the missing child has no instance
            // to attach a check to, so it is driven from the parent.
            ConstraintKind::Mandatory => CheckOutcome::Pass,
        }
    }

    /// Check every constraint of `node` in declaration order, stopping at
    /// the first non-pass outcome.
    pub fn check_node(&self, node: NodeIndex) -> CheckOutcome {
        let schema_id = match self.tree.schema_of(node) {
            Some(id) => id,
            None => return CheckOutcome::Pass,
        };
        for index in 0..self.schema.node(schema_id).constraints.len() {
            let outcome = self.check(node, index);
            if !outcome.is_pass() {
                return outcome;
            }
        }
        CheckOutcome::Pass
    }

    /// Mandatory children absent under a present parent instance.
    pub fn missing_mandatory(&self, parent: NodeIndex) -> Vec<ErrorRecord> {
        checks::mandatory::missing_children(self, parent)
    }

    /// An expression that cannot be evaluated fails its constraint
    /// unconditionally, whatever the data looks like.
    pub(crate) fn expression_failure(
        &self,
        node: NodeIndex,
        constraint: &Constraint,
        error: EvalError,
    ) -> CheckOutcome {
        CheckOutcome::Violation(self.reporter.at_node(
            self.tree,
            node,
            ErrorTag::OperationFailed,
            None,
            format!("Failed to evaluate \"{}\": {}", constraint.text, error),
        ))
    }
}
