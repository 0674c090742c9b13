//! Canopy Eval
//!
//! The XPath evaluation engine: evaluates one parsed constraint expression
//! in the context of one data-tree node and yields a boolean, string,
//! number or node-set.
//!
//! The evaluator is stateless - it borrows the schema, and each call takes
//! an [`EvalContext`] carrying the tree, the context node and the node
//! `current()` refers to. The function table is closed: the functions listed in
//! [`functions::TABLE`] exist, nothing else does, and arity is enforced at
//! call time so an under-specified call fails the constraint that owns it
//! regardless of the data.

mod context;
mod error;
mod eval;
pub mod functions;
mod value;

pub use context::EvalContext;
pub use error::{EvalError, EvalResult};
pub use eval::Evaluator;
pub use functions::NamedFunction;
pub use value::{node_text, XpValue};
