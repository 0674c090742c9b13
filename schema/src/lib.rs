//! Canopy Schema
//!
//! The schema index: an immutable, pre-compiled view of the configuration
//! model that every other component reads. It answers, per schema node,
//! "what constraints apply here" — when/must expressions (parsed once, at
//! build time), leafref targets, identity bases, value bounds, list keys,
//! uniqueness sets and defaults — plus name resolution for path steps,
//! including cross-module prefixes.
//!
//! Construction goes through [`SchemaBuilder`]; the built [`Schema`] never
//! changes afterwards, so evaluators borrow it freely for the lifetime of
//! a request.

mod builder;
mod error;
mod schema;
mod types;

pub use builder::{NodeBuilder, SchemaBuilder};
pub use error::{SchemaError, SchemaResult};
pub use schema::Schema;
pub use types::{Constraint, ConstraintKind, Identity, Module, NodeKind, SchemaNode};
