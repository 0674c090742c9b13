//! End-to-end edit-config scenarios against the reference schema.

use canopy_tests::prelude::*;

fn enabled_iface(f: &Fixture, name: &str) -> ChangeNode {
    iface(f, name).child(ChangeNode::merge(f.enabled).value("true"))
}

#[test]
fn must_with_absent_guard_leaf_is_rejected_at_the_leaf_path() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let edit = interfaces_edit(
        &f,
        iface(&f, "eth0").child(ChangeNode::merge(f.speed).value("1000")),
    );
    let errors = reject(engine.validate(&DataTree::new(), &edit));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].tag, ErrorTag::OperationFailed);
    assert_eq!(errors[0].app_tag, Some(AppTag::MustViolation));
    assert!(errors[0].message.contains("../enabled = 'true'"));
    assert_eq!(errors[0].path, "/if:interfaces/interface[name='eth0']/speed");
}

#[test]
fn dangling_leafref_is_instance_required_with_exact_message() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let (committed, _) = accept(engine.validate(
        &DataTree::new(),
        &interfaces_edit(&f, enabled_iface(&f, "eth0")),
    ));
    let edit = routing_edit(
        &f,
        ChangeNode::merge(f.route)
            .key("dest", "10.0.0.0/8")
            .child(ChangeNode::merge(f.out_interface).value("eth9")),
    );
    let errors = reject(engine.validate(&committed, &edit));
    assert_eq!(errors[0].tag, ErrorTag::DataMissing);
    assert_eq!(errors[0].app_tag, Some(AppTag::InstanceRequired));
    assert_eq!(errors[0].message, "Dependency violated, 'eth9' must exist");
}

#[test]
fn new_entry_under_false_when_is_accepted_and_silently_omitted() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let edit = interfaces_edit(
        &f,
        enabled_iface(&f, "eth1").child(ChangeNode::merge(f.tuning)),
    );
    let (tree, _) = accept(engine.validate(&DataTree::new(), &edit));
    assert_eq!(tree.instances_of(f.interface).len(), 1);
    assert!(tree.instances_of(f.tuning).is_empty());
    assert!(tree.instances_of(f.buffer).is_empty());
}

#[test]
fn duplicate_leaf_list_values_are_data_not_unique_with_one_path() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let edit = interfaces_edit(
        &f,
        enabled_iface(&f, "eth0")
            .child(ChangeNode::create(f.address).value("10.0.0.1"))
            .child(ChangeNode::create(f.address).value("10.0.0.1")),
    );
    let errors = reject(engine.validate(&DataTree::new(), &edit));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].app_tag, Some(AppTag::DataNotUnique));
    assert!(errors[0].path.contains("address[.='10.0.0.1']"));
}

#[test]
fn deleting_the_sole_when_satisfier_cascades_a_synthetic_removal() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let setup = interfaces_edit(
        &f,
        enabled_iface(&f, "eth0")
            .child(ChangeNode::merge(f.jumbo).value("true"))
            .child(ChangeNode::merge(f.tuning)),
    );
    let (committed, setup_synth) = accept(engine.validate(&DataTree::new(), &setup));
    assert!(setup_synth.is_empty());
    assert_eq!(committed.instances_of(f.tuning).len(), 1);

    let edit = interfaces_edit(&f, iface(&f, "eth0").child(ChangeNode::remove(f.jumbo)));
    let (tree, synthetic_edits) = accept(engine.validate(&committed, &edit));
    // Visible on the next read: the dependent subtree is gone, removed
    // by an internally-identified secondary edit rather than an error.
    assert!(tree.instances_of(f.tuning).is_empty());
    assert!(tree.instances_of(f.buffer).is_empty());
    assert_eq!(synthetic_edits.len(), 1);
    assert_eq!(synthetic_edits[0].message_id.to_string(), "internal-1");
}

#[test]
fn underived_identityref_value_is_invalid_value_with_exact_message() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let edit = interfaces_edit(
        &f,
        enabled_iface(&f, "eth0").child(ChangeNode::merge(f.if_type).value("token-ring")),
    );
    let errors = reject(engine.validate(&DataTree::new(), &edit));
    assert_eq!(errors[0].tag, ErrorTag::InvalidValue);
    assert_eq!(
        errors[0].message,
        "Value \"token-ring\" is not a valid identityref value."
    );

    let ok = interfaces_edit(
        &f,
        enabled_iface(&f, "eth0").child(ChangeNode::merge(f.if_type).value("ethernet")),
    );
    accept(engine.validate(&DataTree::new(), &ok));
}
