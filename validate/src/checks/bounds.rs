//! Type bounds: numeric range and string pattern.

use canopy_schema::Constraint;
use canopy_tree::NodeIndex;
use regex_lite::Regex;

use crate::checker::{CheckOutcome, Checker};
use crate::report::{AppTag, ErrorTag};

pub(crate) fn check_range(
    chk: &Checker,
    node: NodeIndex,
    constraint: &Constraint,
    min: f64,
    max: f64,
) -> CheckOutcome {
    let value = match chk.tree.value(node) {
        Some(v) => v,
        None => return CheckOutcome::Pass,
    };
    let number: f64 = value.trim().parse().unwrap_or(f64::NAN);
    if number >= min && number <= max {
        CheckOutcome::Pass
    } else {
        CheckOutcome::Violation(chk.reporter.at_node(
            chk.tree,
            node,
            ErrorTag::InvalidValue,
            Some(AppTag::RangeOutOfBounds),
            format!("Value \"{}\" is out of range {}.", value, constraint.text),
        ))
    }
}

pub(crate) fn check_pattern(
    chk: &Checker,
    node: NodeIndex,
    constraint: &Constraint,
    regex: &Regex,
) -> CheckOutcome {
    let value = match chk.tree.value(node) {
        Some(v) => v,
        None => return CheckOutcome::Pass,
    };
    if regex.is_match(value) {
        CheckOutcome::Pass
    } else {
        CheckOutcome::Violation(chk.reporter.at_node(
            chk.tree,
            node,
            ErrorTag::InvalidValue,
            None,
            format!(
                "Value \"{}\" does not match pattern \"{}\".",
                value, constraint.text
            ),
        ))
    }
}
