//! mandatory: a required child under a present parent.
//!
//! Driven from the parent instance, since the offending child has no
//! instance to attach a check to.

use canopy_schema::{Constraint, ConstraintKind};
use canopy_tree::NodeIndex;

use crate::checker::Checker;
use crate::report::{ErrorRecord, ErrorTag};

pub(crate) fn missing_children(chk: &Checker, parent: NodeIndex) -> Vec<ErrorRecord> {
    let schema_id = match chk.tree.schema_of(parent) {
        Some(id) => id,
        None => return Vec::new(),
    };
    let mut out = Vec::new();
    for &child_schema in &chk.schema.node(schema_id).children {
        let child_def = chk.schema.node(child_schema);
        if !child_def.constraints.iter().any(is_mandatory) {
            continue;
        }
        let present = chk
            .tree
            .children(parent)
            .iter()
            .any(|&c| chk.tree.schema_of(c) == Some(child_schema));
        if !present {
            let path = format!(
                "{}/{}",
                chk.reporter.path(chk.tree, parent),
                chk.schema.qualified_name(child_schema)
            );
            out.push(chk.reporter.record(
                ErrorTag::DataMissing,
                None,
                format!("Mandatory node \"{}\" is missing.", child_def.name),
                path,
            ));
        }
    }
    out
}

fn is_mandatory(constraint: &Constraint) -> bool {
    matches!(constraint.kind, ConstraintKind::Mandatory)
}
