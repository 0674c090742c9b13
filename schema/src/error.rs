//! Schema construction error types.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while building a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Duplicate module name: {0}")]
    DuplicateModule(String),

    #[error("Duplicate node name '{name}' under {parent}")]
    DuplicateNodeName { parent: String, name: String },

    #[error("Unknown parent node: {0}")]
    UnknownParent(String),

    #[error("List '{list}' declares key '{key}' but has no such child leaf")]
    MissingKeyLeaf { list: String, key: String },

    #[error("Unique clause on '{list}' names unknown leaf '{leaf}'")]
    UnknownUniqueLeaf { list: String, leaf: String },

    #[error("Unknown base identity: {0}")]
    UnknownBaseIdentity(String),

    #[error("Invalid expression '{text}' on '{node}': {source}")]
    InvalidExpression {
        node: String,
        text: String,
        #[source]
        source: canopy_xpath::ParseError,
    },

    #[error("Invalid pattern '{pattern}' on '{node}'")]
    InvalidPattern { node: String, pattern: String },
}

impl SchemaError {
    pub fn duplicate_node(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateNodeName {
            parent: parent.into(),
            name: name.into(),
        }
    }

    pub fn invalid_expression(
        node: impl Into<String>,
        text: impl Into<String>,
        source: canopy_xpath::ParseError,
    ) -> Self {
        Self::InvalidExpression {
            node: node.into(),
            text: text.into(),
            source,
        }
    }
}
