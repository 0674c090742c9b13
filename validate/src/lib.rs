//! Canopy Validate
//!
//! Constraint evaluators over a candidate tree.
//!
//! Responsibilities:
//! - Check when, must, leafref, unique, identity, instance-identifier
//!   and type-bound constraints on concrete instances
//! - Detect mandatory children missing under a present parent
//! - Build protocol-shaped error records with absolute instance paths
//! - Memoize which child subtrees carry constraints at all

mod cache;
mod checker;
mod checks;
mod report;

pub use cache::ValidatedChildCache;
pub use checker::{CheckOutcome, Checker};
pub use checks::when::{state as when_state, WhenState};
pub use report::{AppTag, ErrorRecord, ErrorTag, Reporter};
