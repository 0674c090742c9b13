//! Canopy Tests
//!
//! Shared fixture schema and helpers for the integration tests.

pub mod fixture;

pub mod prelude {
    pub use crate::fixture::{accept, fixture, iface, interfaces_edit, reject, routing_edit, Fixture};
    pub use canopy_engine::{Engine, Outcome, SyntheticEdit};
    pub use canopy_tree::{ChangeNode, ChangeTree, DataTree, EditOp};
    pub use canopy_validate::{AppTag, ErrorRecord, ErrorTag};
}
