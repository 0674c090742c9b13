//! Canopy Core
//!
//! Foundational types shared across the validation engine:
//! - Identity types for schema nodes and modules
//! - Instance paths addressing concrete nodes in the data tree

mod id;
mod path;

pub use id::{ModuleId, SchemaNodeId};
pub use path::{InstancePath, PathSegment};
