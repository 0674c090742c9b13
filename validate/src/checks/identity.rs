//! identityref: the value must derive from the declared base identity.

use canopy_tree::NodeIndex;

use crate::checker::{CheckOutcome, Checker};
use crate::report::ErrorTag;

pub(crate) fn check(chk: &Checker, node: NodeIndex, base: &str) -> CheckOutcome {
    let value = match chk.tree.value(node) {
        Some(v) => v,
        None => return CheckOutcome::Pass,
    };
    // The base itself is not a member of its own derivation set.
    if chk.schema.is_derived_from(value, base, false) {
        CheckOutcome::Pass
    } else {
        CheckOutcome::Violation(chk.reporter.at_node(
            chk.tree,
            node,
            ErrorTag::InvalidValue,
            None,
            format!("Value \"{}\" is not a valid identityref value.", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_schema::{Schema, SchemaBuilder};
    use canopy_tree::DataTree;

    fn fixture() -> (Schema, DataTree, NodeIndex) {
        let mut b = SchemaBuilder::new();
        b.add_identity("interface-type", &[]).unwrap();
        b.add_identity("ethernet", &["interface-type"]).unwrap();
        let m = b.add_module("net", "net").unwrap();
        let ifs = b.container(m, None, "interfaces").done().unwrap();
        let kind = b
            .leaf(m, Some(ifs), "type")
            .identityref("interface-type")
            .done()
            .unwrap();
        let schema = b.build().unwrap();

        let mut tree = DataTree::new();
        let ifs_i = tree.add(None, ifs, None);
        let kind_i = tree.add(Some(ifs_i), kind, Some("ethernet".to_string()));
        (schema, tree, kind_i)
    }

    #[test]
    fn derived_identity_passes() {
        let (schema, tree, kind_i) = fixture();
        let chk = Checker::new(&schema, &tree);
        assert_eq!(chk.check(kind_i, 0), CheckOutcome::Pass);
    }

    #[test]
    fn unknown_identity_is_invalid_value_with_exact_message() {
        let (schema, mut tree, kind_i) = fixture();
        tree.set_value(kind_i, Some("token-ring".to_string()));
        let chk = Checker::new(&schema, &tree);
        match chk.check(kind_i, 0) {
            CheckOutcome::Violation(record) => {
                assert_eq!(record.tag, ErrorTag::InvalidValue);
                assert_eq!(record.app_tag, None);
                assert_eq!(
                    record.message,
                    "Value \"token-ring\" is not a valid identityref value."
                );
            }
            other => panic!("expected violation, got {:?}", other),
        }
    }

    #[test]
    fn the_base_itself_is_rejected() {
        let (schema, mut tree, kind_i) = fixture();
        tree.set_value(kind_i, Some("interface-type".to_string()));
        let chk = Checker::new(&schema, &tree);
        assert!(matches!(chk.check(kind_i, 0), CheckOutcome::Violation(_)));
    }
}
