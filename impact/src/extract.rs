//! Static extraction of the schema paths a constraint expression reads.

use canopy_core::SchemaNodeId;
use canopy_schema::Schema;
use canopy_xpath::{Axis, Expr, LocationPath, PathStart};

/// A referenced path: the terminal schema node it lands on, plus the
/// location path as written (kept for runtime narrowing).
#[derive(Debug, Clone)]
pub struct ReferencedPath {
    pub target: SchemaNodeId,
    pub path: LocationPath,
}

/// Collect every schema path an expression owned by `owner` can read:
/// relative, absolute, cross-module, inside predicates and function
/// arguments, and `current()`-rooted. Paths that do not resolve against
/// the schema reference nothing that can change, so they are skipped.
pub fn referenced_paths(schema: &Schema, owner: SchemaNodeId, expr: &Expr) -> Vec<ReferencedPath> {
    let mut out = Vec::new();
    collect(schema, owner, Some(owner), expr, &mut out);
    out
}

fn collect(
    schema: &Schema,
    owner: SchemaNodeId,
    ctx: Option<SchemaNodeId>,
    expr: &Expr,
    out: &mut Vec<ReferencedPath>,
) {
    match expr {
        Expr::Literal(_) | Expr::Number(_) => {}
        Expr::Neg(inner) => collect(schema, owner, ctx, inner, out),
        Expr::Binary(_, left, right) => {
            collect(schema, owner, ctx, left, out);
            collect(schema, owner, ctx, right, out);
        }
        Expr::FnCall(call) => {
            for arg in &call.args {
                collect(schema, owner, ctx, arg, out);
            }
        }
        Expr::Path(path) => collect_path(schema, owner, ctx, path, out),
    }
}

fn collect_path(
    schema: &Schema,
    owner: SchemaNodeId,
    ctx: Option<SchemaNodeId>,
    path: &LocationPath,
    out: &mut Vec<ReferencedPath>,
) {
    let module = schema.node(owner).module;
    let mut cursor: Option<SchemaNodeId> = match path.start {
        PathStart::Root => None,
        PathStart::Context => ctx,
        PathStart::CurrentFn => Some(owner),
    };
    let mut resolvable = true;

    for step in &path.steps {
        if resolvable {
            cursor = match step.axis {
                Axis::SelfAxis => cursor,
                Axis::Parent => match cursor {
                    Some(id) => schema.node(id).parent,
                    // Above the document root there is nothing.
                    None => {
                        resolvable = false;
                        None
                    }
                },
                Axis::Child => {
                    let name = step
                        .name
                        .as_ref()
                        .expect("child step always carries a name test");
                    match schema.resolve_child(cursor, name.prefix.as_deref(), &name.name, module) {
                        Some(id) => Some(id),
                        None => {
                            resolvable = false;
                            None
                        }
                    }
                }
            };
        }
        // Predicates read data too, in the step node's context.
        for predicate in &step.predicates {
            collect(schema, owner, cursor, predicate, out);
        }
        if !resolvable {
            // Later steps cannot resolve either; keep walking only to
            // visit their predicates.
            continue;
        }
    }

    if resolvable {
        if let Some(target) = cursor {
            out.push(ReferencedPath {
                target,
                path: path.clone(),
            });
        }
    }
}
