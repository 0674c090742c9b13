//! Impact expansion, current()-relative predicates and expression
//! failures, end to end.

use canopy_schema::SchemaBuilder;
use canopy_tests::prelude::*;

fn committed_with_backup(f: &Fixture) -> (Engine<'_>, DataTree) {
    let engine = Engine::new(&f.schema);
    let setup = interfaces_edit(
        f,
        iface(f, "eth1").child(ChangeNode::merge(f.enabled).value("true")),
    );
    let (committed, _) = accept(engine.validate(&DataTree::new(), &setup));
    let with_route = routing_edit(
        f,
        ChangeNode::merge(f.route)
            .key("dest", "0.0.0.0/0")
            .child(ChangeNode::merge(f.out_interface).value("eth1"))
            .child(ChangeNode::merge(f.backup).value("eth1")),
    );
    let (committed, _) = accept(engine.validate(&committed, &with_route));
    (engine, committed)
}

#[test]
fn current_predicate_selects_the_entry_named_by_the_validated_leaf() {
    let f = fixture();
    let (engine, committed) = committed_with_backup(&f);
    // A backup naming a disabled (absent) interface fails its must.
    let edit = routing_edit(
        &f,
        ChangeNode::merge(f.route)
            .key("dest", "10.0.0.0/8")
            .child(ChangeNode::merge(f.out_interface).value("eth1"))
            .child(ChangeNode::merge(f.backup).value("eth7")),
    );
    let errors = reject(engine.validate(&committed, &edit));
    assert_eq!(errors[0].app_tag, Some(AppTag::MustViolation));
    assert!(errors[0].path.ends_with("route[dest='10.0.0.0/8']/backup"));
}

#[test]
fn editing_a_distant_module_retriggers_the_constraint_that_reads_it() {
    let f = fixture();
    let (engine, committed) = committed_with_backup(&f);
    // The edit never touches the routing module, but flipping eth1 off
    // breaks the backup's must reached through its current() predicate.
    let edit = interfaces_edit(
        &f,
        iface(&f, "eth1").child(ChangeNode::merge(f.enabled).value("false")),
    );
    let errors = reject(engine.validate(&committed, &edit));
    assert_eq!(errors[0].app_tag, Some(AppTag::MustViolation));
    assert!(errors[0].path.starts_with("/rt:routing/route"));
}

#[test]
fn removing_a_leafref_target_retriggers_the_referencing_leaf() {
    let f = fixture();
    let (engine, committed) = committed_with_backup(&f);
    let edit = interfaces_edit(&f, ChangeNode::remove(f.interface).key("name", "eth1"));
    let errors = reject(engine.validate(&committed, &edit));
    assert_eq!(errors[0].tag, ErrorTag::DataMissing);
    assert_eq!(errors[0].app_tag, Some(AppTag::InstanceRequired));
    assert_eq!(errors[0].message, "Dependency violated, 'eth1' must exist");
}

#[test]
fn deleting_a_leafref_target_with_a_surviving_sibling_is_rejected() {
    // The `name` leaf carries no constraint of its own, so only the
    // impact expansion can bring the referencing leaf back in scope.
    let mut b = SchemaBuilder::new();
    let m = b.add_module("net", "net").unwrap();
    let ifs = b.container(m, None, "interfaces").done().unwrap();
    let iface_l = b.list(m, Some(ifs), "interface", &["name"]).done().unwrap();
    b.leaf(m, Some(iface_l), "name").done().unwrap();
    let rt = b.container(m, None, "routing").done().unwrap();
    let out = b
        .leaf(m, Some(rt), "out-interface")
        .leafref("/net:interfaces/interface/name")
        .done()
        .unwrap();
    let schema = b.build().unwrap();
    let engine = Engine::new(&schema);

    let setup = ChangeTree::new()
        .edit(
            ChangeNode::merge(ifs)
                .child(ChangeNode::merge(iface_l).key("name", "eth0"))
                .child(ChangeNode::merge(iface_l).key("name", "eth1")),
        )
        .edit(ChangeNode::merge(rt).child(ChangeNode::merge(out).value("eth1")));
    let (committed, _) = accept(engine.validate(&DataTree::new(), &setup));

    // eth0 survives; the reference to eth1 must still be re-checked.
    let edit = ChangeTree::new().edit(
        ChangeNode::merge(ifs).child(ChangeNode::remove(iface_l).key("name", "eth1")),
    );
    let errors = reject(engine.validate(&committed, &edit));
    assert_eq!(errors[0].tag, ErrorTag::DataMissing);
    assert_eq!(errors[0].app_tag, Some(AppTag::InstanceRequired));
    assert_eq!(errors[0].message, "Dependency violated, 'eth1' must exist");
}

#[test]
fn an_underspecified_function_call_fails_its_constraint_regardless_of_data() {
    let mut b = SchemaBuilder::new();
    let m = b.add_module("t", "t").unwrap();
    let root = b.container(m, None, "box").done().unwrap();
    let leaf = b
        .leaf(m, Some(root), "size")
        .must("count() > 0")
        .done()
        .unwrap();
    let schema = b.build().unwrap();
    let engine = Engine::new(&schema);

    let edit = ChangeTree::new().edit(
        ChangeNode::merge(root).child(ChangeNode::merge(leaf).value("1")),
    );
    let errors = reject(engine.validate(&DataTree::new(), &edit));
    assert_eq!(errors[0].tag, ErrorTag::OperationFailed);
    assert!(errors[0].message.contains("count"));
}

#[test]
fn instance_identifier_leaf_must_resolve_in_the_committed_tree() {
    let mut b = SchemaBuilder::new();
    let m = b.add_module("net", "net").unwrap();
    let ifs = b.container(m, None, "interfaces").done().unwrap();
    let iface_l = b.list(m, Some(ifs), "interface", &["name"]).done().unwrap();
    b.leaf(m, Some(iface_l), "name").done().unwrap();
    let sys = b.container(m, None, "system").done().unwrap();
    let managed = b
        .leaf(m, Some(sys), "managed")
        .instance_identifier()
        .done()
        .unwrap();
    let schema = b.build().unwrap();
    let engine = Engine::new(&schema);

    let setup = ChangeTree::new().edit(
        ChangeNode::merge(ifs).child(ChangeNode::merge(iface_l).key("name", "lo")),
    );
    let (committed, _) = accept(engine.validate(&DataTree::new(), &setup));

    let good = ChangeTree::new().edit(ChangeNode::merge(sys).child(
        ChangeNode::merge(managed).value("/net:interfaces/interface[name='lo']"),
    ));
    accept(engine.validate(&committed, &good));

    let bad = ChangeTree::new().edit(ChangeNode::merge(sys).child(
        ChangeNode::merge(managed).value("/net:interfaces/interface[name='wan0']"),
    ));
    let errors = reject(engine.validate(&committed, &bad));
    assert_eq!(errors[0].app_tag, Some(AppTag::InstanceRequired));
    assert!(errors[0].message.contains("interface"));
}

#[test]
fn mandatory_child_lost_to_a_deletion_rejects_the_edit() {
    let mut b = SchemaBuilder::new();
    let m = b.add_module("net", "net").unwrap();
    let ntp = b.container(m, None, "ntp").done().unwrap();
    let server = b.leaf(m, Some(ntp), "server").mandatory().done().unwrap();
    let schema = b.build().unwrap();
    let engine = Engine::new(&schema);

    let setup = ChangeTree::new().edit(
        ChangeNode::merge(ntp).child(ChangeNode::merge(server).value("10.0.0.1")),
    );
    let (committed, _) = accept(engine.validate(&DataTree::new(), &setup));

    let edit = ChangeTree::new()
        .edit(ChangeNode::merge(ntp).child(ChangeNode::remove(server)));
    let errors = reject(engine.validate(&committed, &edit));
    assert_eq!(errors[0].tag, ErrorTag::DataMissing);
    assert_eq!(errors[0].path, "/net:ntp/server");
}
