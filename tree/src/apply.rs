//! Application of a change tree onto a staged data tree.

use canopy_core::{InstancePath, PathSegment, SchemaNodeId};
use canopy_schema::{NodeKind, Schema};

use crate::change::{ChangeNode, ChangeTree, EditOp};
use crate::error::{TreeError, TreeResult};
use crate::node::{DataTree, NodeIndex};

/// What an application did, for the orchestrator to schedule validation.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    /// Created nodes and leafs whose value changed, in payload order.
    pub touched: Vec<NodeIndex>,
    /// Live instances explicitly named by the edit (created or merged).
    pub explicit: Vec<NodeIndex>,
    /// Every removed instance (subtree roots and their descendants),
    /// with the path it had before removal.
    pub deleted: Vec<(SchemaNodeId, InstancePath)>,
}

/// Apply a change tree to a staged data tree.
///
/// Structural failures (create-on-existing, delete-on-missing, unknown
/// children, missing list keys) abort immediately; the caller discards
/// the staged tree.
pub fn apply(
    tree: &mut DataTree,
    schema: &Schema,
    change: &ChangeTree,
) -> TreeResult<ApplyOutcome> {
    let mut outcome = ApplyOutcome::default();
    for edit in &change.edits {
        apply_node(tree, schema, None, edit, &mut outcome)?;
    }
    Ok(outcome)
}

fn apply_node(
    tree: &mut DataTree,
    schema: &Schema,
    parent: Option<NodeIndex>,
    cn: &ChangeNode,
    out: &mut ApplyOutcome,
) -> TreeResult<()> {
    check_parentage(tree, schema, parent, cn)?;

    let leaf_list_value = match schema.node(cn.schema).kind {
        NodeKind::LeafList => cn.value.as_deref(),
        _ => None,
    };
    let existing = tree.find_child(schema, parent, cn.schema, &cn.keys, leaf_list_value);

    match cn.op {
        EditOp::Merge => match existing {
            Some(idx) => {
                out.explicit.push(idx);
                if cn.value.is_some() && tree.set_value(idx, cn.value.clone()) {
                    out.touched.push(idx);
                }
                for child in &cn.children {
                    apply_node(tree, schema, Some(idx), child, out)?;
                }
                Ok(())
            }
            None => create_subtree(tree, schema, parent, cn, out).map(|_| ()),
        },
        EditOp::Create => match existing {
            Some(idx) => {
                // A key leaf restated inside a created list entry selects
                // the entry rather than conflicting with it.
                if is_key_leaf(schema, cn.schema) && tree.value(idx) == cn.value.as_deref() {
                    out.explicit.push(idx);
                    return Ok(());
                }
                // A repeated leaf-list value is a uniqueness question for
                // validation, not a structural conflict.
                if matches!(schema.node(cn.schema).kind, NodeKind::LeafList) {
                    return create_subtree(tree, schema, parent, cn, out).map(|_| ());
                }
                Err(TreeError::CreateExists {
                    path: render_path(schema, &tree.path_of(schema, idx)),
                })
            }
            None => create_subtree(tree, schema, parent, cn, out).map(|_| ()),
        },
        EditOp::Replace => {
            if let Some(idx) = existing {
                record_deletion(tree, schema, idx, out);
                tree.remove_subtree(idx);
            }
            create_subtree(tree, schema, parent, cn, out).map(|_| ())
        }
        EditOp::Delete => match existing {
            Some(idx) => {
                record_deletion(tree, schema, idx, out);
                tree.remove_subtree(idx);
                Ok(())
            }
            None => Err(TreeError::DeleteMissing {
                path: render_path(schema, &target_path(tree, schema, parent, cn)),
            }),
        },
        EditOp::Remove => {
            if let Some(idx) = existing {
                record_deletion(tree, schema, idx, out);
                tree.remove_subtree(idx);
            }
            Ok(())
        }
    }
}

fn create_subtree(
    tree: &mut DataTree,
    schema: &Schema,
    parent: Option<NodeIndex>,
    cn: &ChangeNode,
    out: &mut ApplyOutcome,
) -> TreeResult<NodeIndex> {
    let node = schema.node(cn.schema);
    let value = if node.kind.is_leafy() {
        cn.value.clone()
    } else {
        None
    };
    let idx = tree.add(parent, cn.schema, value);
    out.touched.push(idx);
    out.explicit.push(idx);

    // List entries materialize their key leafs from the selector.
    if let NodeKind::List { keys } = &node.kind {
        for key in keys {
            let value = cn
                .keys
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| TreeError::MissingKey {
                    path: render_path(schema, &tree.path_of(schema, idx)),
                    key: key.clone(),
                })?;
            let key_schema =
                schema
                    .child_by_name(cn.schema, key)
                    .ok_or_else(|| TreeError::UnknownChild {
                        path: render_path(schema, &tree.path_of(schema, idx)),
                        child: key.clone(),
                    })?;
            let key_idx = tree.add(Some(idx), key_schema, Some(value));
            out.touched.push(key_idx);
            out.explicit.push(key_idx);
        }
    }

    for child in &cn.children {
        apply_node(tree, schema, Some(idx), child, out)?;
    }
    Ok(idx)
}

fn record_deletion(tree: &DataTree, schema: &Schema, idx: NodeIndex, out: &mut ApplyOutcome) {
    for node in tree.descendants(idx) {
        if let Some(schema_id) = tree.schema_of(node) {
            out.deleted.push((schema_id, tree.path_of(schema, node)));
        }
    }
}

fn check_parentage(
    tree: &DataTree,
    schema: &Schema,
    parent: Option<NodeIndex>,
    cn: &ChangeNode,
) -> TreeResult<()> {
    let expected = schema.node(cn.schema).parent;
    let actual = parent.and_then(|p| tree.schema_of(p));
    if expected == actual {
        Ok(())
    } else {
        let path = match parent {
            Some(p) => render_path(schema, &tree.path_of(schema, p)),
            None => "/".to_string(),
        };
        Err(TreeError::UnknownChild {
            path,
            child: schema.node(cn.schema).name.clone(),
        })
    }
}

/// Path a change node addresses, for errors about instances that do not
/// exist.
fn target_path(
    tree: &DataTree,
    schema: &Schema,
    parent: Option<NodeIndex>,
    cn: &ChangeNode,
) -> InstancePath {
    let base = match parent {
        Some(p) => tree.path_of(schema, p),
        None => InstancePath::root(),
    };
    let keys = match schema.node(cn.schema).kind {
        NodeKind::LeafList => cn
            .value
            .clone()
            .map(|v| vec![(".".to_string(), v)])
            .unwrap_or_default(),
        _ => cn.keys.clone(),
    };
    base.child(PathSegment::with_keys(cn.schema, keys))
}

fn is_key_leaf(schema: &Schema, id: SchemaNodeId) -> bool {
    let node = schema.node(id);
    match node.parent {
        Some(parent) => schema.node(parent).keys().iter().any(|k| k == &node.name),
        None => false,
    }
}

fn render_path(schema: &Schema, path: &InstancePath) -> String {
    path.render(|id| schema.qualified_name(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeTree;
    use canopy_schema::SchemaBuilder;

    struct Fixture {
        schema: Schema,
        system: SchemaNodeId,
        server: SchemaNodeId,
        port: SchemaNodeId,
        dns: SchemaNodeId,
    }

    fn fixture() -> Fixture {
        let mut b = SchemaBuilder::new();
        let m = b.add_module("net", "net").unwrap();
        let system = b.container(m, None, "system").done().unwrap();
        let server = b.list(m, Some(system), "server", &["name"]).done().unwrap();
        b.leaf(m, Some(server), "name").done().unwrap();
        let port = b.leaf(m, Some(server), "port").done().unwrap();
        let dns = b.leaf_list(m, Some(system), "dns").done().unwrap();
        Fixture {
            schema: b.build().unwrap(),
            system,
            server,
            port,
            dns,
        }
    }

    fn server_edit(f: &Fixture, op: EditOp, name: &str) -> ChangeTree {
        ChangeTree::new().edit(
            ChangeNode::merge(f.system)
                .child(ChangeNode::new(f.server, op).key("name", name)),
        )
    }

    #[test]
    fn merge_creates_missing_subtree_with_keys() {
        let f = fixture();
        let mut tree = DataTree::new();
        let change = ChangeTree::new().edit(
            ChangeNode::merge(f.system).child(
                ChangeNode::merge(f.server)
                    .key("name", "a")
                    .child(ChangeNode::merge(f.port).value("80")),
            ),
        );
        let out = apply(&mut tree, &f.schema, &change).unwrap();
        assert_eq!(out.touched.len(), 4); // system, server, name key, port
        let entry = tree.instances_of(f.server)[0];
        assert_eq!(
            tree.key_values(&f.schema, entry),
            vec![("name".to_string(), "a".to_string())]
        );
    }

    #[test]
    fn merge_is_an_upsert_on_the_second_application() {
        let f = fixture();
        let mut tree = DataTree::new();
        let change = server_edit(&f, EditOp::Merge, "a");
        apply(&mut tree, &f.schema, &change).unwrap();
        let out = apply(&mut tree, &f.schema, &change).unwrap();
        assert!(out.touched.is_empty());
        assert_eq!(tree.instances_of(f.server).len(), 1);
    }

    #[test]
    fn create_on_existing_instance_fails() {
        let f = fixture();
        let mut tree = DataTree::new();
        apply(&mut tree, &f.schema, &server_edit(&f, EditOp::Merge, "a")).unwrap();
        let err = apply(&mut tree, &f.schema, &server_edit(&f, EditOp::Create, "a")).unwrap_err();
        match err {
            TreeError::CreateExists { path } => {
                assert_eq!(path, "/net:system/server[name='a']");
            }
            other => panic!("expected CreateExists, got {:?}", other),
        }
    }

    #[test]
    fn delete_on_missing_instance_fails_with_target_path() {
        let f = fixture();
        let mut tree = DataTree::new();
        apply(&mut tree, &f.schema, &server_edit(&f, EditOp::Merge, "a")).unwrap();
        let err = apply(&mut tree, &f.schema, &server_edit(&f, EditOp::Delete, "b")).unwrap_err();
        match err {
            TreeError::DeleteMissing { path } => {
                assert_eq!(path, "/net:system/server[name='b']");
            }
            other => panic!("expected DeleteMissing, got {:?}", other),
        }
    }

    #[test]
    fn remove_tolerates_missing_instance() {
        let f = fixture();
        let mut tree = DataTree::new();
        apply(&mut tree, &f.schema, &server_edit(&f, EditOp::Merge, "a")).unwrap();
        let out = apply(&mut tree, &f.schema, &server_edit(&f, EditOp::Remove, "b")).unwrap();
        assert!(out.deleted.is_empty());
    }

    #[test]
    fn delete_records_every_removed_descendant() {
        let f = fixture();
        let mut tree = DataTree::new();
        let change = ChangeTree::new().edit(
            ChangeNode::merge(f.system).child(
                ChangeNode::merge(f.server)
                    .key("name", "a")
                    .child(ChangeNode::merge(f.port).value("80")),
            ),
        );
        apply(&mut tree, &f.schema, &change).unwrap();
        let out = apply(&mut tree, &f.schema, &server_edit(&f, EditOp::Delete, "a")).unwrap();
        // entry + name key + port
        assert_eq!(out.deleted.len(), 3);
        assert_eq!(out.deleted[0].0, f.server);
        assert!(tree.instances_of(f.server).is_empty());
    }

    #[test]
    fn replace_rebuilds_the_subtree() {
        let f = fixture();
        let mut tree = DataTree::new();
        let initial = ChangeTree::new().edit(
            ChangeNode::merge(f.system).child(
                ChangeNode::merge(f.server)
                    .key("name", "a")
                    .child(ChangeNode::merge(f.port).value("80")),
            ),
        );
        apply(&mut tree, &f.schema, &initial).unwrap();

        let replace = ChangeTree::new().edit(
            ChangeNode::merge(f.system)
                .child(ChangeNode::replace(f.server).key("name", "a")),
        );
        apply(&mut tree, &f.schema, &replace).unwrap();
        let entry = tree.instances_of(f.server)[0];
        // Port leaf is gone; only the key leaf remains.
        assert_eq!(tree.children(entry).len(), 1);
    }

    #[test]
    fn leaf_list_entries_select_by_value() {
        let f = fixture();
        let mut tree = DataTree::new();
        let add = |v: &str| {
            ChangeTree::new().edit(
                ChangeNode::merge(f.system).child(ChangeNode::merge(f.dns).value(v)),
            )
        };
        apply(&mut tree, &f.schema, &add("8.8.8.8")).unwrap();
        apply(&mut tree, &f.schema, &add("9.9.9.9")).unwrap();
        apply(&mut tree, &f.schema, &add("8.8.8.8")).unwrap(); // merge, no dup
        assert_eq!(tree.instances_of(f.dns).len(), 2);

        let remove = ChangeTree::new().edit(
            ChangeNode::merge(f.system).child(ChangeNode::remove(f.dns).value("8.8.8.8")),
        );
        apply(&mut tree, &f.schema, &remove).unwrap();
        assert_eq!(tree.instances_of(f.dns).len(), 1);
    }

    #[test]
    fn creating_a_duplicate_leaf_list_value_is_left_to_validation() {
        let f = fixture();
        let mut tree = DataTree::new();
        let add = ChangeTree::new().edit(
            ChangeNode::merge(f.system).child(ChangeNode::create(f.dns).value("8.8.8.8")),
        );
        apply(&mut tree, &f.schema, &add).unwrap();
        apply(&mut tree, &f.schema, &add).unwrap();
        assert_eq!(tree.instances_of(f.dns).len(), 2);
    }

    #[test]
    fn restating_the_key_leaf_inside_a_create_is_not_a_conflict() {
        let f = fixture();
        let name = f.schema.child_by_name(f.server, "name").unwrap();
        let mut tree = DataTree::new();
        let change = ChangeTree::new().edit(
            ChangeNode::merge(f.system).child(
                ChangeNode::create(f.server)
                    .key("name", "a")
                    .child(ChangeNode::create(name).value("a")),
            ),
        );
        apply(&mut tree, &f.schema, &change).unwrap();
        assert_eq!(tree.instances_of(name).len(), 1);
    }
}
