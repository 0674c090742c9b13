//! Canopy Engine
//!
//! The validation orchestrator.
//!
//! Responsibilities:
//! - Stage one request's candidate tree and apply the proposed edit
//! - Evaluate direct constraints, expand through the impact index,
//!   and iterate to a bounded fixpoint
//! - Turn newly-false when conditions on prior-state nodes into
//!   synthetic removal edits replayed through the same pipeline
//! - Materialize default values once their governing when holds
//! - Accept with the new tree and synthetic edits, or reject with
//!   path-addressed error records

mod context;
mod defaults;
mod engine;

pub use context::ValidationContext;
pub use defaults::{DefaultInjector, SchemaDefaults};
pub use engine::{Engine, MessageId, Outcome, SyntheticEdit};
