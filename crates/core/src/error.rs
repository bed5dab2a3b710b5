use revtrail_common::Operation;

/// Integrity errors raised by the change-capture core.
///
/// Under [`StrictnessPolicy::FailHard`](crate::StrictnessPolicy) these
/// abort the enclosing mutation before commit; under `Permissive` the
/// corresponding audit detail is degraded and logged instead.
#[derive(Debug, thiserror::Error)]
pub enum TrailError {
    #[error("record {model}:{id} has no stamped revision number; it was never put under version control")]
    MissingRevision { model: String, id: String },
    #[error("no actor resolved for {operation} on {model}:{id}")]
    MissingActor {
        model: String,
        id: String,
        operation: Operation,
    },
    #[error("required metadata field `{0}` was not provided")]
    MissingMetadata(String),
}
