//! must: an integrity predicate on a present node.

use canopy_eval::EvalContext;
use canopy_schema::Constraint;
use canopy_tree::NodeIndex;

use crate::checker::{CheckOutcome, Checker};
use crate::report::{AppTag, ErrorTag};

pub(crate) fn check(chk: &Checker, node: NodeIndex, constraint: &Constraint) -> CheckOutcome {
    let expr = match &constraint.expr {
        Some(e) => e,
        None => return CheckOutcome::Pass,
    };
    let ctx = EvalContext::new(chk.tree, node);
    match chk.evaluator.evaluate_bool(expr, &ctx) {
        Ok(true) => CheckOutcome::Pass,
        Ok(false) => CheckOutcome::Violation(chk.reporter.at_node(
            chk.tree,
            node,
            ErrorTag::OperationFailed,
            Some(AppTag::MustViolation),
            format!("Must condition \"{}\" not satisfied.", constraint.text),
        )),
        Err(e) => chk.expression_failure(node, constraint, e),
    }
}
