//! instance-identifier: the value is itself a path that must resolve.

use canopy_eval::EvalContext;
use canopy_tree::NodeIndex;
use canopy_xpath::{Expr, LocationPath, PathStart, Step};

use crate::checker::{CheckOutcome, Checker};
use crate::report::{AppTag, ErrorTag};

pub(crate) fn check(chk: &Checker, node: NodeIndex, require_instance: bool) -> CheckOutcome {
    let value = match chk.tree.value(node) {
        Some(v) => v,
        None => return CheckOutcome::Pass,
    };
    let path = match canopy_xpath::parse(value) {
        Ok(Expr::Path(p)) if p.start == PathStart::Root && !p.steps.is_empty() => p,
        _ => {
            return CheckOutcome::Violation(chk.reporter.at_node(
                chk.tree,
                node,
                ErrorTag::InvalidValue,
                None,
                format!("Invalid instance-identifier \"{}\".", value),
            ))
        }
    };
    if !require_instance {
        return CheckOutcome::Pass;
    }
    // Resolve segment by segment so the error can name the first
    // segment that does not exist.
    let ctx = EvalContext::new(chk.tree, node);
    for end in 1..=path.steps.len() {
        let prefix = LocationPath::new(PathStart::Root, path.steps[..end].to_vec());
        let resolved = match chk.evaluator.resolve_path(&prefix, &ctx) {
            Ok(nodes) => nodes,
            Err(_) => Vec::new(),
        };
        if resolved.is_empty() {
            return CheckOutcome::Violation(chk.reporter.at_node(
                chk.tree,
                node,
                ErrorTag::DataMissing,
                Some(AppTag::InstanceRequired),
                format!(
                    "Required instance \"{}\" does not exist.",
                    segment_name(&path.steps[end - 1])
                ),
            ));
        }
    }
    CheckOutcome::Pass
}

fn segment_name(step: &Step) -> String {
    match &step.name {
        Some(name) => name.to_string(),
        None => ".".to_string(),
    }
}
