//! Typed expression AST.
//!
//! The AST is deliberately closed: only the constructs the schema language
//! emits exist, so the evaluator can match exhaustively.

use std::fmt;

/// Binary operators, in one flat enum; precedence is the parser's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// True for `=`, `!=`, `<`, `<=`, `>`, `>=`.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    /// True for `+`, `-`, `*`, `div`, `mod`.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
        };
        f.write_str(s)
    }
}

/// A possibly-prefixed name. A missing prefix means "same module as the
/// expression's context node".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub name: String,
}

impl QName {
    pub fn new(prefix: Option<String>, name: impl Into<String>) -> Self {
        Self {
            prefix,
            name: name.into(),
        }
    }

    pub fn unprefixed(name: impl Into<String>) -> Self {
        Self::new(None, name)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Step axes. The dialect needs no others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `name` — a child of the context node.
    Child,
    /// `..` — the parent of the context node.
    Parent,
    /// `.` — the context node itself.
    SelfAxis,
}

/// One location step: axis, optional name test, optional predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    /// `None` for `.` and `..`.
    pub name: Option<QName>,
    pub predicates: Vec<Expr>,
}

impl Step {
    pub fn child(name: QName) -> Self {
        Self {
            axis: Axis::Child,
            name: Some(name),
            predicates: Vec::new(),
        }
    }

    pub fn parent() -> Self {
        Self {
            axis: Axis::Parent,
            name: None,
            predicates: Vec::new(),
        }
    }

    pub fn self_axis() -> Self {
        Self {
            axis: Axis::SelfAxis,
            name: None,
            predicates: Vec::new(),
        }
    }
}

/// Where a location path begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStart {
    /// Absolute: `/mod:a/b` — from the document root, possibly a different
    /// top-level module than the context node's.
    Root,
    /// Relative: `a/b`, `./a`, `../a`, bare `.` — from the context node.
    Context,
    /// `current()/...` — from the node the constraint is being evaluated
    /// for (the innermost enclosing context when nested in a predicate).
    CurrentFn,
}

/// A location path: a start point plus zero or more steps.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub start: PathStart,
    pub steps: Vec<Step>,
}

impl LocationPath {
    pub fn new(start: PathStart, steps: Vec<Step>) -> Self {
        Self { start, steps }
    }

    /// Bare `.`.
    pub fn context() -> Self {
        Self::new(PathStart::Context, Vec::new())
    }
}

/// A function call. Names are resolved against the closed function table
/// at evaluation time; arity is checked there too, so an under-specified
/// call fails the constraint that owns it rather than schema construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FnCall {
    pub name: String,
    pub args: Vec<Expr>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String literal.
    Literal(String),
    /// Numeric literal.
    Number(f64),
    /// A location path.
    Path(LocationPath),
    /// A function call.
    FnCall(FnCall),
    /// A binary operation.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Unary minus.
    Neg(Box<Expr>),
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }
}
