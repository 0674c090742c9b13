//! Identity types for schema entities.
//!
//! All identifiers are small integers that are:
//! - Unique within one compiled schema
//! - Immutable once assigned
//! - Opaque to external users

use std::fmt;

/// Unique identifier for a schema node (container, list, leaf, leaf-list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaNodeId(pub u32);

impl SchemaNodeId {
    /// Create a new SchemaNodeId from a raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SchemaNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Unique identifier for a top-level module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u16);

impl ModuleId {
    /// Create a new ModuleId from a raw value.
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_namespace_prefix() {
        assert_eq!(SchemaNodeId::new(7).to_string(), "s7");
        assert_eq!(ModuleId::new(2).to_string(), "m2");
    }

    #[test]
    fn ids_are_ordered_by_raw_value() {
        assert!(SchemaNodeId::new(1) < SchemaNodeId::new(2));
    }
}
