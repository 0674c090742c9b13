//! Canopy Tree
//!
//! The model node tree (persisted configuration) and the change tree
//! (one request's proposed edit), plus the application of a change tree
//! onto a staged copy of the model tree with protocol edit-operation
//! semantics (merge / replace / create / delete / remove).
//!
//! The tree is an arena: nodes are indexed, removal tombstones slots, and
//! the whole tree is `Clone` so a request stages its candidate by cloning
//! the committed tree and mutating the clone.

mod apply;
mod change;
mod error;
mod node;

pub use apply::{apply, ApplyOutcome};
pub use change::{ChangeNode, ChangeTree, EditOp};
pub use error::{TreeError, TreeResult};
pub use node::{DataNode, DataTree, NodeIndex};
