//! Expression evaluation.

use canopy_schema::Schema;
use canopy_tree::NodeIndex;
use canopy_xpath::{Axis, BinaryOp, Expr, LocationPath, PathStart, Step};

use crate::context::EvalContext;
use crate::error::EvalResult;
use crate::functions;
use crate::value::{node_text, XpValue};

/// Expression evaluator.
///
/// The evaluator is stateless - it borrows the schema, and each eval call
/// takes the context (tree + context node + `current()` node) as a parameter.
pub struct Evaluator<'s> {
    schema: &'s Schema,
}

/// Where a path step continues from: a concrete node, or the document
/// root above all top-level instances (reached by `/` or by `..` off a
/// top-level node).
#[derive(Debug, Clone, Copy, PartialEq)]
enum Frontier {
    Root,
    Node(NodeIndex),
}

impl<'s> Evaluator<'s> {
    /// Create a new evaluator.
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// The schema this evaluator resolves names and identities against.
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Evaluate an expression in the given context.
    pub fn evaluate(&self, expr: &Expr, ctx: &EvalContext) -> EvalResult<XpValue> {
        match expr {
            Expr::Literal(s) => Ok(XpValue::Text(s.clone())),
            Expr::Number(n) => Ok(XpValue::Number(*n)),
            Expr::Neg(inner) => {
                let n = self.evaluate(inner, ctx)?.to_number(ctx.tree);
                Ok(XpValue::Number(-n))
            }
            Expr::Path(path) => Ok(XpValue::Nodes(self.resolve_path(path, ctx)?)),
            Expr::FnCall(call) => {
                let func = functions::lookup(&call.name, call.args.len())?;
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.evaluate(arg, ctx)?);
                }
                (func.eval)(self, ctx, args)
            }
            Expr::Binary(op, left, right) => self.eval_binary(*op, left, right, ctx),
        }
    }

    /// Evaluate and coerce to boolean.
    pub fn evaluate_bool(&self, expr: &Expr, ctx: &EvalContext) -> EvalResult<bool> {
        Ok(self.evaluate(expr, ctx)?.to_boolean())
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: &EvalContext,
    ) -> EvalResult<XpValue> {
        match op {
            BinaryOp::Or => {
                if self.evaluate_bool(left, ctx)? {
                    return Ok(XpValue::Boolean(true));
                }
                Ok(XpValue::Boolean(self.evaluate_bool(right, ctx)?))
            }
            BinaryOp::And => {
                if !self.evaluate_bool(left, ctx)? {
                    return Ok(XpValue::Boolean(false));
                }
                Ok(XpValue::Boolean(self.evaluate_bool(right, ctx)?))
            }
            op if op.is_comparison() => {
                let lv = self.evaluate(left, ctx)?;
                let rv = self.evaluate(right, ctx)?;
                Ok(XpValue::Boolean(self.compare(op, &lv, &rv, ctx)))
            }
            op => {
                // Arithmetic: text coerces to number only here.
                let a = self.evaluate(left, ctx)?.to_number(ctx.tree);
                let b = self.evaluate(right, ctx)?.to_number(ctx.tree);
                let n = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Mod => a % b,
                    _ => unreachable!("non-arithmetic operator {op}"),
                };
                Ok(XpValue::Number(n))
            }
        }
    }

    /// XPath 1.0 comparison: node-sets compare existentially.
    fn compare(&self, op: BinaryOp, left: &XpValue, right: &XpValue, ctx: &EvalContext) -> bool {
        match (left, right) {
            (XpValue::Nodes(ls), XpValue::Nodes(rs)) => ls.iter().any(|&l| {
                let lt = XpValue::Text(node_text(ctx.tree, l));
                rs.iter().any(|&r| {
                    let rt = XpValue::Text(node_text(ctx.tree, r));
                    self.compare_scalar(op, &lt, &rt, ctx)
                })
            }),
            (XpValue::Nodes(ls), other) => ls.iter().any(|&l| {
                let lt = XpValue::Text(node_text(ctx.tree, l));
                self.compare_scalar(op, &lt, other, ctx)
            }),
            (other, XpValue::Nodes(rs)) => rs.iter().any(|&r| {
                let rt = XpValue::Text(node_text(ctx.tree, r));
                self.compare_scalar(op, other, &rt, ctx)
            }),
            (l, r) => self.compare_scalar(op, l, r, ctx),
        }
    }

    fn compare_scalar(&self, op: BinaryOp, left: &XpValue, right: &XpValue, ctx: &EvalContext) -> bool {
        match op {
            BinaryOp::Eq | BinaryOp::NotEq => {
                let equal = match (left, right) {
                    (XpValue::Boolean(_), _) | (_, XpValue::Boolean(_)) => {
                        left.to_boolean() == right.to_boolean()
                    }
                    (XpValue::Number(_), _) | (_, XpValue::Number(_)) => {
                        left.to_number(ctx.tree) == right.to_number(ctx.tree)
                    }
                    _ => left.to_text(ctx.tree) == right.to_text(ctx.tree),
                };
                if op == BinaryOp::Eq {
                    equal
                } else {
                    !equal
                }
            }
            BinaryOp::Lt => left.to_number(ctx.tree) < right.to_number(ctx.tree),
            BinaryOp::LtEq => left.to_number(ctx.tree) <= right.to_number(ctx.tree),
            BinaryOp::Gt => left.to_number(ctx.tree) > right.to_number(ctx.tree),
            BinaryOp::GtEq => left.to_number(ctx.tree) >= right.to_number(ctx.tree),
            _ => unreachable!("non-comparison operator {op}"),
        }
    }

    /// Resolve a location path to its node-set, in document order.
    pub fn resolve_path(
        &self,
        path: &LocationPath,
        ctx: &EvalContext,
    ) -> EvalResult<Vec<NodeIndex>> {
        let mut frontier: Vec<Frontier> = match path.start {
            PathStart::Root => vec![Frontier::Root],
            PathStart::Context => vec![Frontier::Node(ctx.context)],
            PathStart::CurrentFn => vec![Frontier::Node(ctx.current())],
        };

        for step in &path.steps {
            frontier = self.advance(&frontier, step, ctx)?;
            if frontier.is_empty() {
                return Ok(Vec::new());
            }
        }

        Ok(frontier
            .into_iter()
            .filter_map(|f| match f {
                Frontier::Node(idx) => Some(idx),
                Frontier::Root => None,
            })
            .collect())
    }

    fn advance(
        &self,
        frontier: &[Frontier],
        step: &Step,
        ctx: &EvalContext,
    ) -> EvalResult<Vec<Frontier>> {
        let mut next = Vec::new();
        for &from in frontier {
            match step.axis {
                Axis::SelfAxis => push_unique(&mut next, from),
                Axis::Parent => {
                    if let Frontier::Node(idx) = from {
                        match ctx.tree.node(idx).and_then(|n| n.parent) {
                            Some(parent) => push_unique(&mut next, Frontier::Node(parent)),
                            None => push_unique(&mut next, Frontier::Root),
                        }
                    }
                }
                Axis::Child => {
                    let name = step
                        .name
                        .as_ref()
                        .expect("child step always carries a name test");
                    let candidates = self.children_named(from, name, ctx);
                    for idx in candidates {
                        if self.passes_predicates(idx, &step.predicates, ctx)? {
                            push_unique(&mut next, Frontier::Node(idx));
                        }
                    }
                }
            }
        }
        Ok(next)
    }

    /// Children of a frontier point matching a (possibly prefixed) name.
    fn children_named(
        &self,
        from: Frontier,
        name: &canopy_xpath::QName,
        ctx: &EvalContext,
    ) -> Vec<NodeIndex> {
        let ctx_module = match ctx.tree.schema_of(ctx.context) {
            Some(id) => self.schema.node(id).module,
            None => return Vec::new(),
        };
        let (parent_schema, candidates): (Option<_>, Vec<NodeIndex>) = match from {
            Frontier::Root => (None, ctx.tree.roots().to_vec()),
            Frontier::Node(idx) => match ctx.tree.schema_of(idx) {
                Some(sid) => (Some(sid), ctx.tree.children(idx).to_vec()),
                None => return Vec::new(),
            },
        };
        let target = match self.schema.resolve_child(
            parent_schema,
            name.prefix.as_deref(),
            &name.name,
            ctx_module,
        ) {
            Some(id) => id,
            None => return Vec::new(),
        };
        candidates
            .into_iter()
            .filter(|&c| ctx.tree.schema_of(c) == Some(target))
            .collect()
    }

    fn passes_predicates(
        &self,
        candidate: NodeIndex,
        predicates: &[Expr],
        ctx: &EvalContext,
    ) -> EvalResult<bool> {
        for predicate in predicates {
            let sub = ctx.with_context(candidate);
            if !self.evaluate_bool(predicate, &sub)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn push_unique(list: &mut Vec<Frontier>, item: Frontier) {
    if !list.contains(&item) {
        list.push(item);
    }
}
