//! unique: no two sibling entries may share identity.
//!
//! Covers duplicates introduced within one edit payload as well as
//! clashes against prior state; by the time the checker runs, both look
//! the same in the candidate tree.

use canopy_tree::NodeIndex;

use crate::checker::{CheckOutcome, Checker};
use crate::report::{AppTag, ErrorTag};

pub(crate) fn check(chk: &Checker, node: NodeIndex, leafs: &[String]) -> CheckOutcome {
    let (schema_id, parent) = match chk.tree.node(node) {
        Some(n) => (n.schema, n.parent),
        None => return CheckOutcome::Pass,
    };
    let siblings: Vec<NodeIndex> = match parent {
        Some(p) => chk.tree.children(p).to_vec(),
        None => chk.tree.roots().to_vec(),
    };

    if leafs.is_empty() {
        // Leaf-list entry: identity is the value itself.
        let value = chk.tree.value(node).unwrap_or("").to_string();
        let duplicated = siblings.iter().any(|&s| {
            s != node
                && chk.tree.schema_of(s) == Some(schema_id)
                && chk.tree.value(s).unwrap_or("") == value
        });
        if duplicated {
            return CheckOutcome::Violation(chk.reporter.at_node(
                chk.tree,
                node,
                ErrorTag::OperationFailed,
                Some(AppTag::DataNotUnique),
                format!("Duplicate value \"{}\".", value),
            ));
        }
        return CheckOutcome::Pass;
    }

    // List entry: identity is the tuple of the named leafs. An entry
    // missing one of them is exempt from the clause.
    let tuple = match leaf_tuple(chk, node, leafs) {
        Some(t) => t,
        None => return CheckOutcome::Pass,
    };
    let duplicated = siblings.iter().any(|&s| {
        s != node
            && chk.tree.schema_of(s) == Some(schema_id)
            && leaf_tuple(chk, s, leafs).as_ref() == Some(&tuple)
    });
    if duplicated {
        CheckOutcome::Violation(chk.reporter.at_node(
            chk.tree,
            node,
            ErrorTag::OperationFailed,
            Some(AppTag::DataNotUnique),
            format!("Sibling entries share unique leafs \"{}\".", leafs.join(" ")),
        ))
    } else {
        CheckOutcome::Pass
    }
}

fn leaf_tuple(chk: &Checker, entry: NodeIndex, leafs: &[String]) -> Option<Vec<String>> {
    let schema_id = chk.tree.schema_of(entry)?;
    leafs
        .iter()
        .map(|leaf| {
            let leaf_schema = chk.schema.child_by_name(schema_id, leaf)?;
            let child = chk
                .tree
                .children(entry)
                .iter()
                .find(|&&c| chk.tree.schema_of(c) == Some(leaf_schema))?;
            chk.tree.value(*child).map(str::to_string)
        })
        .collect()
}
