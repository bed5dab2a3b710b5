//! Change-capture core: decides when a mutation is audit-worthy and what
//! exactly changed.
//!
//! # Invariants
//! - `normalize` and `diff` are pure; identical inputs yield identical
//!   outputs, including entry ordering.
//! - Only the sequencer ever advances a record's revision counter.
//! - Nested associations (structured object values) are stripped at
//!   normalization and never diffed.

mod config;
mod context;
mod delta;
mod error;
mod sequencer;
mod snapshot;

pub use config::{AttributeNames, MetaField, StrictnessPolicy, TrailConfig};
pub use context::{ActorContext, ResolvedActor};
pub use delta::{diff, render, Delta, DeltaEntry};
pub use error::TrailError;
pub use sequencer::next_revision;
pub use snapshot::{normalize, Snapshot};
