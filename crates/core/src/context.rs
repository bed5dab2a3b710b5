use crate::{MetaField, StrictnessPolicy, TrailError};
use revtrail_common::{FieldMap, Operation, RowId};
use serde_json::Value;

/// Ambient per-operation actor identity and metadata.
///
/// Established once by the caller that triggers a mutation and threaded
/// explicitly through both hook phases of that logical operation, so the
/// after-phase can attribute the audit row even though it runs in an
/// unrelated stack frame. Never shared across concurrent operations.
#[derive(Debug, Clone, Default)]
pub struct ActorContext {
    actor_id: Option<String>,
    metadata: FieldMap,
}

impl ActorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, id: impl Into<String>) -> Self {
        self.actor_id = Some(id.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn metadata(&self) -> &FieldMap {
        &self.metadata
    }
}

/// Actor identity and metadata as resolved for one audit row.
#[derive(Debug, Clone, Default)]
pub struct ResolvedActor {
    pub actor_id: Option<String>,
    pub metadata: FieldMap,
}

impl ResolvedActor {
    /// Resolve the effective actor for an audit row.
    ///
    /// Precedence: the ambient context value wins, the explicit per-call
    /// override fills the gap. The metadata bag resolves as a whole, not
    /// per key.
    pub fn resolve(
        ambient: Option<&ActorContext>,
        override_actor: Option<&str>,
        override_meta: Option<&FieldMap>,
    ) -> Self {
        let actor_id = ambient
            .and_then(|c| c.actor_id())
            .or(override_actor)
            .map(str::to_string);
        let metadata = ambient
            .map(ActorContext::metadata)
            .filter(|m| !m.is_empty())
            .or(override_meta)
            .cloned()
            .unwrap_or_default();
        Self { actor_id, metadata }
    }

    /// Check that every declared required metadata field resolved to a
    /// defined value. Fatal under fail-hard; otherwise the field is
    /// simply absent from the audit row.
    pub fn validate_required(
        &self,
        meta_fields: &[MetaField],
        policy: StrictnessPolicy,
    ) -> Result<(), TrailError> {
        for field in meta_fields.iter().filter(|f| f.required) {
            if self.metadata.get(&field.name).is_none() {
                if policy.fail_hard() {
                    return Err(TrailError::MissingMetadata(field.name.clone()));
                }
                tracing::debug!(field = %field.name, "required metadata field not provided");
            }
        }
        Ok(())
    }

    /// Fail-hard integrity check: an update or destroy must be
    /// attributable to an actor.
    pub fn require_actor(
        &self,
        operation: Operation,
        model: &str,
        id: RowId,
        policy: StrictnessPolicy,
    ) -> Result<(), TrailError> {
        let attributable = self.actor_id.as_deref().is_some_and(|a| !a.is_empty());
        if policy.fail_hard() && !attributable && operation != Operation::Create {
            return Err(TrailError::MissingActor {
                model: model.to_string(),
                id: id.to_string(),
                operation,
            });
        }
        Ok(())
    }
}
