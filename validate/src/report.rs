//! Structured error records, mapped onto the protocol error vocabulary.

use std::fmt;

use canopy_schema::Schema;
use canopy_tree::{DataTree, NodeIndex};

/// Protocol error-tag, closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTag {
    DataMissing,
    UnknownElement,
    OperationFailed,
    InvalidValue,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::InvalidValue => "invalid-value",
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol error-app-tag, closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTag {
    WhenViolation,
    MustViolation,
    InstanceRequired,
    DataNotUnique,
    RangeOutOfBounds,
}

impl AppTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppTag::WhenViolation => "when-violation",
            AppTag::MustViolation => "must-violation",
            AppTag::InstanceRequired => "instance-required",
            AppTag::DataNotUnique => "data-not-unique",
            AppTag::RangeOutOfBounds => "range-out-of-specified-bounds",
        }
    }
}

impl fmt::Display for AppTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejection reason, addressed to a concrete instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub tag: ErrorTag,
    pub app_tag: Option<AppTag>,
    /// Human-readable message quoting the literal constraint text.
    pub message: String,
    /// Absolute instance path, module-prefixed, list predicates by key.
    pub path: String,
}

impl ErrorRecord {
    /// error-type of every record this core produces.
    pub fn error_type(&self) -> &'static str {
        "application"
    }

    /// error-severity of every record this core produces.
    pub fn severity(&self) -> &'static str {
        "error"
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.tag, self.path, self.message)
    }
}

/// Builds error records with rendered instance paths.
pub struct Reporter<'s> {
    schema: &'s Schema,
}

impl<'s> Reporter<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Absolute path of a live instance.
    pub fn path(&self, tree: &DataTree, node: NodeIndex) -> String {
        tree.path_of(self.schema, node)
            .render(|id| self.schema.qualified_name(id))
    }

    pub fn record(
        &self,
        tag: ErrorTag,
        app_tag: Option<AppTag>,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> ErrorRecord {
        ErrorRecord {
            tag,
            app_tag,
            message: message.into(),
            path: path.into(),
        }
    }

    /// Record addressed at a live instance.
    pub fn at_node(
        &self,
        tree: &DataTree,
        node: NodeIndex,
        tag: ErrorTag,
        app_tag: Option<AppTag>,
        message: impl Into<String>,
    ) -> ErrorRecord {
        self.record(tag, app_tag, message, self.path(tree, node))
    }
}
