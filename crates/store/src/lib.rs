//! Audit persistence: revision rows, per-field change diffs, and the
//! lifecycle hook bundle that wires the change-capture core into a host
//! persistence layer.
//!
//! # Invariants
//! - Revision rows are written inside the caller's transaction; mutation
//!   and audit commit or roll back together.
//! - A change row is only written after its revision row exists; change
//!   write failures are logged, never rolled back into the revision.
//! - Revision rows are never updated or deleted by this engine.

mod changes;
mod error;
mod hooks;
mod memory;
mod persister;
mod revision;
mod store;

pub use changes::{apply_chunks, char_diff, ChunkTag, DiffChunk};
pub use error::AuditError;
pub use hooks::{
    register, Association, AuditHooks, MutationOptions, PendingAudit, RevisionSchema, TrackedModel,
};
pub use memory::{MemoryStore, MemoryTx};
pub use persister::AuditPersister;
pub use revision::{Document, NewRevision, NewRevisionChange, Revision, RevisionChange};
pub use store::{RevisionStore, StoreError};
