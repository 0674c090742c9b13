//! Evaluation context: the node an expression is evaluated at, plus the
//! node `current()` refers to.

use canopy_tree::{DataTree, NodeIndex};

/// Request-scoped evaluation state for one expression.
///
/// `current` is pinned at construction to the node the expression is
/// evaluated for and never changes afterwards: predicate evaluation
/// swaps only the context node, so `current()` refers to the same node
/// at any predicate depth.
#[derive(Debug, Clone)]
pub struct EvalContext<'t> {
    pub tree: &'t DataTree,
    /// The context node of the expression.
    pub context: NodeIndex,
    current: NodeIndex,
}

impl<'t> EvalContext<'t> {
    /// Context for evaluating a constraint attached to `node`.
    pub fn new(tree: &'t DataTree, node: NodeIndex) -> Self {
        Self {
            tree,
            context: node,
            current: node,
        }
    }

    /// The node `current()` resolves to.
    pub fn current(&self) -> NodeIndex {
        self.current
    }

    /// Same `current()` node, different context node (predicate evaluation).
    pub fn with_context(&self, node: NodeIndex) -> Self {
        Self {
            tree: self.tree,
            context: node,
            current: self.current,
        }
    }
}
