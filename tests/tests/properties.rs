//! System-level properties of the validation pipeline.

use canopy_tests::prelude::*;
use canopy_schema::SchemaBuilder;

fn base_edit(f: &Fixture) -> ChangeTree {
    interfaces_edit(
        f,
        iface(f, "eth0")
            .child(ChangeNode::merge(f.enabled).value("true"))
            .child(ChangeNode::merge(f.address).value("10.0.0.1")),
    )
}

#[test]
fn resubmitting_an_applied_edit_is_a_no_op() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let edit = base_edit(&f);
    let (committed, first_synth) = accept(engine.validate(&DataTree::new(), &edit));
    assert!(first_synth.is_empty());
    let before = committed.preorder().len();

    let (again, synth) = accept(engine.validate(&committed, &edit));
    assert!(synth.is_empty());
    assert_eq!(again.preorder().len(), before);
    assert_eq!(again.instances_of(f.interface).len(), 1);
}

#[test]
fn committed_tree_reflects_defaults_and_excludes_false_when_nodes() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let edit = interfaces_edit(
        &f,
        iface(&f, "eth0")
            .child(ChangeNode::merge(f.enabled).value("true"))
            .child(ChangeNode::merge(f.jumbo).value("false"))
            .child(ChangeNode::merge(f.tuning)),
    );
    let (tree, _) = accept(engine.validate(&DataTree::new(), &edit));
    // True-when default present with its declared value.
    let mtu = tree.instances_of(f.mtu);
    assert_eq!(mtu.len(), 1);
    assert_eq!(tree.value(mtu[0]), Some("1500"));
    // False-when subtree absent, defaults under it included.
    assert!(tree.instances_of(f.tuning).is_empty());
    assert!(tree.instances_of(f.buffer).is_empty());
}

#[test]
fn every_committed_leafref_resolves() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let (committed, _) = accept(engine.validate(&DataTree::new(), &base_edit(&f)));
    let edit = routing_edit(
        &f,
        ChangeNode::merge(f.route)
            .key("dest", "0.0.0.0/0")
            .child(ChangeNode::merge(f.out_interface).value("eth0")),
    );
    let (tree, _) = accept(engine.validate(&committed, &edit));

    let names: Vec<String> = tree
        .instances_of(f.name)
        .into_iter()
        .filter_map(|n| tree.value(n).map(str::to_string))
        .collect();
    for leaf in tree.instances_of(f.out_interface) {
        let value = tree.value(leaf).unwrap().to_string();
        assert!(names.contains(&value));
    }
}

#[test]
fn committed_siblings_never_share_identity() {
    let f = fixture();
    let engine = Engine::new(&f.schema);
    let edit = interfaces_edit(
        &f,
        iface(&f, "eth0")
            .child(ChangeNode::merge(f.enabled).value("true"))
            .child(ChangeNode::merge(f.address).value("10.0.0.1"))
            .child(ChangeNode::merge(f.address).value("10.0.0.2")),
    );
    let (tree, _) = accept(engine.validate(&DataTree::new(), &edit));
    let mut values: Vec<&str> = tree
        .instances_of(f.address)
        .into_iter()
        .filter_map(|n| tree.value(n))
        .collect();
    let before = values.len();
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len(), before);
}

#[test]
fn cascades_terminate_within_the_impact_bound() {
    // A two-stage when chain: stage1 depends on a, stage2 on a leaf
    // inside stage1. Turning a off must cascade through both within
    // the pass bound derived from the impact index.
    let mut b = SchemaBuilder::new();
    let m = b.add_module("chain", "ch").unwrap();
    let root = b.container(m, None, "chain").done().unwrap();
    let a = b.leaf(m, Some(root), "a").done().unwrap();
    let stage1 = b
        .container(m, Some(root), "stage1")
        .when("../a = 'on'")
        .done()
        .unwrap();
    let marker = b.leaf(m, Some(stage1), "marker").done().unwrap();
    let stage2 = b
        .container(m, Some(root), "stage2")
        .when("../stage1/marker = 'go'")
        .done()
        .unwrap();
    let schema = b.build().unwrap();
    let engine = Engine::new(&schema);

    let setup = ChangeTree::new().edit(
        ChangeNode::merge(root)
            .child(ChangeNode::merge(a).value("on"))
            .child(ChangeNode::merge(stage1).child(ChangeNode::merge(marker).value("go")))
            .child(ChangeNode::merge(stage2)),
    );
    let (committed, _) = accept(engine.validate(&DataTree::new(), &setup));

    let flip = ChangeTree::new()
        .edit(ChangeNode::merge(root).child(ChangeNode::merge(a).value("off")));
    match engine.validate(&committed, &flip) {
        Outcome::Accepted {
            tree,
            synthetic_edits,
            passes,
        } => {
            assert!(tree.instances_of(stage1).is_empty());
            assert!(tree.instances_of(stage2).is_empty());
            assert_eq!(synthetic_edits.len(), 2);
            assert!(passes <= engine.impact().covered_nodes() + 1);
        }
        Outcome::Rejected { errors } => panic!("rejected: {:?}", errors),
    }
}
