//! Shared types for the revtrail audit engine.
//!
//! # Invariants
//! - `FieldMap` iteration order is deterministic (BTreeMap).
//! - `RowId` values are opaque to the engine; it never derives meaning
//!   from them beyond identity.

mod record;
mod types;

pub use record::{BasicRecord, TrackedRecord};
pub use types::{to_underscored, FieldMap, Operation, RowId};
