//! when: should this node exist at all?

use canopy_eval::{EvalContext, EvalResult, Evaluator};
use canopy_schema::Constraint;
use canopy_tree::{DataTree, NodeIndex};

use crate::checker::{CheckOutcome, Checker};

/// Tri-state answer to "may this node be present".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenState {
    /// The node has no when condition.
    Unknown,
    True,
    False,
}

impl WhenState {
    /// The node is allowed to exist.
    pub fn permits(&self) -> bool {
        !matches!(self, WhenState::False)
    }
}

/// Evaluate the when condition of a live instance, if it has one.
pub fn state(
    evaluator: &Evaluator<'_>,
    tree: &DataTree,
    node: NodeIndex,
) -> EvalResult<WhenState> {
    let schema_id = match tree.schema_of(node) {
        Some(id) => id,
        None => return Ok(WhenState::Unknown),
    };
    let when = match evaluator.schema().node(schema_id).when() {
        Some(c) => c,
        None => return Ok(WhenState::Unknown),
    };
    let expr = match &when.expr {
        Some(e) => e,
        None => return Ok(WhenState::Unknown),
    };
    let ctx = EvalContext::new(tree, node);
    if evaluator.evaluate_bool(expr, &ctx)? {
        Ok(WhenState::True)
    } else {
        Ok(WhenState::False)
    }
}

pub(crate) fn check(chk: &Checker, node: NodeIndex, constraint: &Constraint) -> CheckOutcome {
    let expr = match &constraint.expr {
        Some(e) => e,
        None => return CheckOutcome::Pass,
    };
    let ctx = EvalContext::new(chk.tree, node);
    match chk.evaluator.evaluate_bool(expr, &ctx) {
        Ok(true) => CheckOutcome::Pass,
        Ok(false) => CheckOutcome::WhenFalse,
        Err(e) => chk.expression_failure(node, constraint, e),
    }
}
