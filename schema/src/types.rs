//! Schema definition types.

use canopy_core::{ModuleId, SchemaNodeId};
use canopy_xpath::Expr;
use regex_lite::Regex;

/// A top-level module.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    /// Prefix used in expressions and rendered error paths.
    pub prefix: String,
}

/// Structural kind of a schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    /// Ordered key leaf names identify entries.
    List { keys: Vec<String> },
    Leaf,
    LeafList,
}

impl NodeKind {
    pub fn is_leafy(&self) -> bool {
        matches!(self, NodeKind::Leaf | NodeKind::LeafList)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, NodeKind::List { .. })
    }
}

/// One constraint attached to a schema node.
///
/// `text` is the literal expression (or target path) as written in the
/// model; error messages quote it verbatim. `expr` is the AST parsed at
/// schema build time for the kinds that carry an expression.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub text: String,
    pub expr: Option<Expr>,
}

/// Constraint kinds, closed set.
#[derive(Debug, Clone)]
pub enum ConstraintKind {
    /// Existence condition; false means the node may not be present.
    When,
    /// Integrity predicate on a present node; false is always a failure.
    Must,
    /// The leaf's value must match an instance at the target path.
    Leafref { require_instance: bool },
    /// No two sibling entries may share this identity: the named leafs
    /// for a list `unique` clause, the value itself for a leaf-list.
    Unique { leafs: Vec<String> },
    /// A child required under a present parent.
    Mandatory,
    /// identityref: value must derive from the base identity.
    Identity { base: String },
    /// Value is itself a data-tree path that must resolve.
    InstanceIdentifier { require_instance: bool },
    /// Numeric bounds from the leaf's type.
    Range { min: f64, max: f64 },
    /// String pattern from the leaf's type.
    Pattern { regex: Regex },
}

impl ConstraintKind {
    /// Short name used in reports and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ConstraintKind::When => "when",
            ConstraintKind::Must => "must",
            ConstraintKind::Leafref { .. } => "leafref",
            ConstraintKind::Unique { .. } => "unique",
            ConstraintKind::Mandatory => "mandatory",
            ConstraintKind::Identity { .. } => "identityref",
            ConstraintKind::InstanceIdentifier { .. } => "instance-identifier",
            ConstraintKind::Range { .. } => "range",
            ConstraintKind::Pattern { .. } => "pattern",
        }
    }
}

/// A schema node: one container, list, leaf or leaf-list in the model.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub id: SchemaNodeId,
    pub module: ModuleId,
    pub name: String,
    pub parent: Option<SchemaNodeId>,
    pub children: Vec<SchemaNodeId>,
    pub kind: NodeKind,
    pub constraints: Vec<Constraint>,
    /// Default value for leafs; materialized only once the governing
    /// when (if any) is true.
    pub default: Option<String>,
    /// Enumeration name -> declared numeric value, for `enum-value()`.
    pub enumeration: Vec<(String, i64)>,
}

impl SchemaNode {
    /// The list key names, empty for non-lists.
    pub fn keys(&self) -> &[String] {
        match &self.kind {
            NodeKind::List { keys } => keys,
            _ => &[],
        }
    }

    /// The node's when constraint, if any.
    pub fn when(&self) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| matches!(c.kind, ConstraintKind::When))
    }

    /// Numeric value of an enumeration member.
    pub fn enum_value(&self, name: &str) -> Option<i64> {
        self.enumeration
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// An identity with its base identities.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Qualified name as it appears in leaf values, e.g. `ianaift:ethernetCsmacd`.
    pub name: String,
    pub bases: Vec<String>,
}
