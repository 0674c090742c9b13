//! Expression values and XPath 1.0 coercions.

use canopy_tree::{DataTree, NodeIndex};

/// The string-value of a node: its text for leafs and leaf-list entries,
/// empty for containers and list entries.
pub fn node_text(tree: &DataTree, index: NodeIndex) -> String {
    tree.value(index).unwrap_or("").to_string()
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum XpValue {
    Boolean(bool),
    Number(f64),
    Text(String),
    /// Node-set in document order.
    Nodes(Vec<NodeIndex>),
}

impl XpValue {
    /// XPath truthiness: empty string, zero, NaN and the empty node-set
    /// are false.
    pub fn to_boolean(&self) -> bool {
        match self {
            XpValue::Boolean(b) => *b,
            XpValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XpValue::Text(s) => !s.is_empty(),
            XpValue::Nodes(nodes) => !nodes.is_empty(),
        }
    }

    /// Numeric coercion. Text that fails to parse becomes NaN; a node-set
    /// converts via the string-value of its first node.
    pub fn to_number(&self, tree: &DataTree) -> f64 {
        match self {
            XpValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            XpValue::Number(n) => *n,
            XpValue::Text(s) => parse_number(s),
            XpValue::Nodes(nodes) => match nodes.first() {
                Some(&idx) => parse_number(&node_text(tree, idx)),
                None => f64::NAN,
            },
        }
    }

    /// String coercion.
    pub fn to_text(&self, tree: &DataTree) -> String {
        match self {
            XpValue::Boolean(b) => b.to_string(),
            XpValue::Number(n) => format_number(*n),
            XpValue::Text(s) => s.clone(),
            XpValue::Nodes(nodes) => match nodes.first() {
                Some(&idx) => node_text(tree, idx),
                None => String::new(),
            },
        }
    }

    /// The node-set, if this value is one.
    pub fn as_nodes(&self) -> Option<&[NodeIndex]> {
        match self {
            XpValue::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }
}

fn parse_number(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Render a number the way XPath string() does: integral values without a
/// fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
