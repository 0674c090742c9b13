//! Tree error types.

use thiserror::Error;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors raised while applying a change tree.
///
/// Paths are already rendered (absolute, module-prefixed, key predicates)
/// because application is the last point where the schema and the
/// still-existing instance are both at hand.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TreeError {
    #[error("Data exists; cannot create {path}")]
    CreateExists { path: String },

    #[error("Data missing; cannot delete {path}")]
    DeleteMissing { path: String },

    #[error("Node {path} has no child schema node '{child}'")]
    UnknownChild { path: String, child: String },

    #[error("List entry {path} is missing key '{key}'")]
    MissingKey { path: String, key: String },

    #[error("Stale node index {index}")]
    StaleIndex { index: usize },
}
