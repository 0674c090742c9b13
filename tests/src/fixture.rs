//! The reference schema the integration tests run against: an
//! interfaces module plus a routing module that reaches into it.

use canopy_core::SchemaNodeId;
use canopy_engine::{Outcome, SyntheticEdit};
use canopy_schema::{Schema, SchemaBuilder};
use canopy_tree::{ChangeNode, ChangeTree, DataTree};
use canopy_validate::ErrorRecord;

pub struct Fixture {
    pub schema: Schema,
    pub interfaces: SchemaNodeId,
    pub interface: SchemaNodeId,
    pub name: SchemaNodeId,
    pub enabled: SchemaNodeId,
    pub mtu: SchemaNodeId,
    pub if_type: SchemaNodeId,
    pub speed: SchemaNodeId,
    pub address: SchemaNodeId,
    pub jumbo: SchemaNodeId,
    pub tuning: SchemaNodeId,
    pub buffer: SchemaNodeId,
    pub routing: SchemaNodeId,
    pub route: SchemaNodeId,
    pub dest: SchemaNodeId,
    pub out_interface: SchemaNodeId,
    pub backup: SchemaNodeId,
}

/// Two modules:
///
/// ```text
/// if:interfaces/interface[name]
///   name       pattern
///   enabled
///   mtu        range 68..9216, default 1500
///   type       identityref interface-type
///   speed      must ../enabled = 'true'
///   address*   leaf-list (values unique)
///   jumbo
///   tuning     when ../jumbo = 'true'
///     buffer   default 9000
/// rt:routing/route[dest]
///   dest
///   out-interface  leafref /if:interfaces/interface/name
///   backup         must /if:interfaces/interface[name = current()]/enabled = 'true'
/// ```
pub fn fixture() -> Fixture {
    let mut b = SchemaBuilder::new();
    b.add_identity("interface-type", &[]).unwrap();
    b.add_identity("ethernet", &["interface-type"]).unwrap();
    b.add_identity("loopback", &["interface-type"]).unwrap();

    let ifm = b.add_module("interfaces", "if").unwrap();
    let interfaces = b.container(ifm, None, "interfaces").done().unwrap();
    let interface = b
        .list(ifm, Some(interfaces), "interface", &["name"])
        .done()
        .unwrap();
    let name = b
        .leaf(ifm, Some(interface), "name")
        .pattern("[A-Za-z][A-Za-z0-9./-]*")
        .done()
        .unwrap();
    let enabled = b.leaf(ifm, Some(interface), "enabled").done().unwrap();
    let mtu = b
        .leaf(ifm, Some(interface), "mtu")
        .range(68.0, 9216.0)
        .default_value("1500")
        .done()
        .unwrap();
    let if_type = b
        .leaf(ifm, Some(interface), "type")
        .identityref("interface-type")
        .done()
        .unwrap();
    let speed = b
        .leaf(ifm, Some(interface), "speed")
        .must("../enabled = 'true'")
        .done()
        .unwrap();
    let address = b.leaf_list(ifm, Some(interface), "address").done().unwrap();
    let jumbo = b.leaf(ifm, Some(interface), "jumbo").done().unwrap();
    let tuning = b
        .container(ifm, Some(interface), "tuning")
        .when("../jumbo = 'true'")
        .done()
        .unwrap();
    let buffer = b
        .leaf(ifm, Some(tuning), "buffer")
        .default_value("9000")
        .done()
        .unwrap();

    let rtm = b.add_module("routing", "rt").unwrap();
    let routing = b.container(rtm, None, "routing").done().unwrap();
    let route = b
        .list(rtm, Some(routing), "route", &["dest"])
        .done()
        .unwrap();
    let dest = b.leaf(rtm, Some(route), "dest").done().unwrap();
    let out_interface = b
        .leaf(rtm, Some(route), "out-interface")
        .leafref("/if:interfaces/interface/name")
        .done()
        .unwrap();
    let backup = b
        .leaf(rtm, Some(route), "backup")
        .must("/if:interfaces/interface[name = current()]/enabled = 'true'")
        .done()
        .unwrap();

    Fixture {
        schema: b.build().unwrap(),
        interfaces,
        interface,
        name,
        enabled,
        mtu,
        if_type,
        speed,
        address,
        jumbo,
        tuning,
        buffer,
        routing,
        route,
        dest,
        out_interface,
        backup,
    }
}

/// A merge edit for one interface entry.
pub fn iface(f: &Fixture, name: &str) -> ChangeNode {
    ChangeNode::merge(f.interface).key("name", name)
}

pub fn interfaces_edit(f: &Fixture, entry: ChangeNode) -> ChangeTree {
    ChangeTree::new().edit(ChangeNode::merge(f.interfaces).child(entry))
}

pub fn routing_edit(f: &Fixture, entry: ChangeNode) -> ChangeTree {
    ChangeTree::new().edit(ChangeNode::merge(f.routing).child(entry))
}

#[track_caller]
pub fn accept(outcome: Outcome) -> (DataTree, Vec<SyntheticEdit>) {
    match outcome {
        Outcome::Accepted {
            tree,
            synthetic_edits,
            ..
        } => (tree, synthetic_edits),
        Outcome::Rejected { errors } => panic!("edit rejected: {:?}", errors),
    }
}

#[track_caller]
pub fn reject(outcome: Outcome) -> Vec<ErrorRecord> {
    match outcome {
        Outcome::Rejected { errors } => errors,
        Outcome::Accepted { tree, .. } => {
            panic!("edit accepted with {} nodes", tree.preorder().len())
        }
    }
}
