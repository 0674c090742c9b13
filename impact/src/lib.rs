//! Canopy Impact
//!
//! The static reverse-dependency map: for every schema node, which
//! constraints anywhere in the schema read it and must therefore be
//! re-evaluated when an instance of it changes. Built once per schema by
//! walking every constraint expression; consulted at runtime to expand a
//! concrete change into the ordered set of impacted existing instances.

mod extract;
mod index;

pub use extract::referenced_paths;
pub use index::{ConstraintRef, Impacted, ImpactIndex};
