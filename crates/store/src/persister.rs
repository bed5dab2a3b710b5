use crate::changes::char_diff;
use crate::error::AuditError;
use crate::hooks::PendingAudit;
use crate::revision::{Document, NewRevision, NewRevisionChange, Revision};
use crate::store::RevisionStore;
use revtrail_common::{FieldMap, Operation, TrackedRecord};
use revtrail_core::{normalize, render, ResolvedActor, TrailConfig};
use serde_json::Value;
use tracing::{debug, warn};

/// Builds and durably writes the audit rows for one committed-to mutation.
pub struct AuditPersister<'a, S: RevisionStore> {
    config: &'a TrailConfig,
    store: &'a S,
}

impl<'a, S: RevisionStore> AuditPersister<'a, S> {
    pub fn new(config: &'a TrailConfig, store: &'a S) -> Self {
        Self { config, store }
    }

    /// Write the revision row for `pending` inside `tx`, then the
    /// per-field change rows when enabled.
    ///
    /// The document snapshot is re-derived here rather than reusing the
    /// before-phase snapshots: instance state may have been clamped
    /// between phases. A revision write failure propagates (rolling the
    /// transaction back); change-row failures are logged and skipped.
    pub fn persist(
        &self,
        record: &dyn TrackedRecord,
        pending: &PendingAudit,
        actor: &ResolvedActor,
        touched_fields: Option<&[String]>,
        tx: &mut S::Tx,
    ) -> Result<Revision, AuditError> {
        let document = self.build_document(record, pending.operation, touched_fields);

        let mut metadata = FieldMap::new();
        let reserved = self.config.reserved_columns();
        for field in &self.config.meta_fields {
            let Some(value) = actor.metadata.get(&field.name) else {
                continue;
            };
            if reserved.contains(&field.name.as_str()) {
                debug!(field = %field.name, "metadata field collides with a revision column, not overwriting");
                continue;
            }
            metadata.insert(field.name.clone(), value.clone());
        }

        let revision = self.store.insert_revision(
            tx,
            NewRevision {
                model: record.model_name().to_string(),
                document_id: record.record_id(),
                actor_id: actor.actor_id.clone(),
                revision: pending.revision,
                operation: pending.operation,
                document: Document::encode(document, self.config.text_documents),
                metadata,
            },
        )?;
        debug!(
            model = %revision.model,
            record = %revision.document_id,
            number = revision.revision,
            operation = %revision.operation,
            "revision written"
        );

        if self.config.enable_revision_change && pending.operation == Operation::Update {
            self.persist_changes(&revision, pending, tx)?;
        }

        Ok(revision)
    }

    /// Best-effort secondary detail: one change row per delta entry,
    /// strictly after the revision id is known. A failed write is logged
    /// and does not unwind the revision.
    fn persist_changes(
        &self,
        revision: &Revision,
        pending: &PendingAudit,
        tx: &mut S::Tx,
    ) -> Result<(), AuditError> {
        for entry in &pending.delta {
            let lhs = render(entry.lhs());
            let rhs = render(entry.rhs());
            let diff = char_diff(&lhs, &rhs);

            let change = NewRevisionChange {
                revision_id: revision.id,
                path: entry.field().to_string(),
                document: Document::encode(
                    serde_json::to_value(entry)?,
                    self.config.text_documents,
                ),
                diff: Document::encode(serde_json::to_value(&diff)?, self.config.text_documents),
            };
            if let Err(err) = self.store.insert_change(tx, change) {
                warn!(
                    revision = %revision.id,
                    path = %entry.field(),
                    error = %err,
                    "revision change write failed"
                );
            }
        }
        Ok(())
    }

    fn build_document(
        &self,
        record: &dyn TrackedRecord,
        operation: Operation,
        touched_fields: Option<&[String]>,
    ) -> Value {
        // Destroy stores the last-known state and never compresses.
        let (state, only) = if operation == Operation::Destroy {
            (record.previous_values(), None)
        } else {
            (
                record.current_values(),
                self.config.enable_compression.then_some(touched_fields).flatten(),
            )
        };
        let snapshot = normalize(state, &self.config.exclude, only);
        Value::Object(snapshot.into_inner().into_iter().collect())
    }
}
