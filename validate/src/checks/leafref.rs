//! leafref: the leaf's value must match an instance at the target path.

use canopy_eval::{node_text, EvalContext};
use canopy_schema::Constraint;
use canopy_tree::NodeIndex;
use canopy_xpath::Expr;

use crate::checker::{CheckOutcome, Checker};
use crate::report::{AppTag, ErrorTag};

pub(crate) fn check(
    chk: &Checker,
    node: NodeIndex,
    constraint: &Constraint,
    require_instance: bool,
) -> CheckOutcome {
    let value = match chk.tree.value(node) {
        Some(v) => v.to_string(),
        None => return CheckOutcome::Pass,
    };
    let path = match &constraint.expr {
        Some(Expr::Path(p)) => p,
        // The builder only attaches leafrefs with a parsed path target.
        _ => return CheckOutcome::Pass,
    };
    let ctx = EvalContext::new(chk.tree, node);
    let targets = match chk.evaluator.resolve_path(path, &ctx) {
        Ok(t) => t,
        Err(e) => return chk.expression_failure(node, constraint, e),
    };
    let satisfied = targets
        .iter()
        .any(|&t| node_text(chk.tree, t) == value);
    if satisfied || !require_instance {
        CheckOutcome::Pass
    } else {
        CheckOutcome::Violation(chk.reporter.at_node(
            chk.tree,
            node,
            ErrorTag::DataMissing,
            Some(AppTag::InstanceRequired),
            format!("Dependency violated, '{}' must exist", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_schema::{Schema, SchemaBuilder};
    use canopy_tree::DataTree;

    fn fixture(require: bool) -> (Schema, DataTree, NodeIndex) {
        let mut b = SchemaBuilder::new();
        let m = b.add_module("net", "net").unwrap();
        let ifs = b.container(m, None, "interfaces").done().unwrap();
        let iface = b.list(m, Some(ifs), "interface", &["name"]).done().unwrap();
        b.leaf(m, Some(iface), "name").done().unwrap();
        let routing = b.container(m, None, "routing").done().unwrap();
        let out = b.leaf(m, Some(routing), "out-interface");
        let out = if require {
            out.leafref("/net:interfaces/interface/name")
        } else {
            out.leafref_no_require("/net:interfaces/interface/name")
        }
        .done()
        .unwrap();
        let schema = b.build().unwrap();

        let name = schema.child_by_name(iface, "name").unwrap();
        let mut tree = DataTree::new();
        let ifs_i = tree.add(None, ifs, None);
        let eth0 = tree.add(Some(ifs_i), iface, None);
        tree.add(Some(eth0), name, Some("eth0".to_string()));
        let routing_i = tree.add(None, routing, None);
        let out_i = tree.add(Some(routing_i), out, Some("eth9".to_string()));
        (schema, tree, out_i)
    }

    #[test]
    fn dangling_reference_is_instance_required() {
        let (schema, tree, out_i) = fixture(true);
        let chk = Checker::new(&schema, &tree);
        match chk.check(out_i, 0) {
            CheckOutcome::Violation(record) => {
                assert_eq!(record.tag, ErrorTag::DataMissing);
                assert_eq!(record.app_tag, Some(AppTag::InstanceRequired));
                assert_eq!(
                    record.message,
                    "Dependency violated, 'eth9' must exist"
                );
            }
            other => panic!("expected violation, got {:?}", other),
        }
    }

    #[test]
    fn resolving_reference_passes() {
        let (schema, mut tree, out_i) = fixture(true);
        tree.set_value(out_i, Some("eth0".to_string()));
        let chk = Checker::new(&schema, &tree);
        assert_eq!(chk.check(out_i, 0), CheckOutcome::Pass);
    }

    #[test]
    fn miss_is_tolerated_without_require_instance() {
        let (schema, tree, out_i) = fixture(false);
        let chk = Checker::new(&schema, &tree);
        assert_eq!(chk.check(out_i, 0), CheckOutcome::Pass);
    }
}
