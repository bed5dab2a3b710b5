use crate::store::StoreError;
use revtrail_core::TrailError;

/// Umbrella error for hook and persister calls.
///
/// Integrity and persistence errors both surface as a failed mutation to
/// the original caller; change-row write failures never do (they are
/// logged inside the persister instead).
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Integrity(#[from] TrailError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("document serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
