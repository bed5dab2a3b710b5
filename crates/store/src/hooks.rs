use crate::error::AuditError;
use crate::persister::AuditPersister;
use crate::revision::Revision;
use crate::store::RevisionStore;
use revtrail_common::{FieldMap, Operation, TrackedRecord};
use revtrail_core::{
    diff, next_revision, normalize, ActorContext, Delta, ResolvedActor, TrailConfig,
};
use serde_json::Value;
use tracing::debug;

/// Per-call options bag passed by the host alongside a mutation.
#[derive(Debug, Clone, Default)]
pub struct MutationOptions {
    /// Bypass all audit capture for this single mutation.
    pub opt_out: bool,
    /// Explicit actor override; the ambient context takes precedence.
    pub actor_id: Option<String>,
    /// Explicit metadata override; the ambient context takes precedence.
    pub metadata: Option<FieldMap>,
    /// Fields touched by this mutation; in compression mode only these
    /// are snapshotted and diffed.
    pub touched_fields: Option<Vec<String>>,
}

impl MutationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opt_out(mut self) -> Self {
        self.opt_out = true;
        self
    }

    pub fn with_actor(mut self, id: impl Into<String>) -> Self {
        self.actor_id = Some(id.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(FieldMap::new)
            .insert(key.into(), value);
        self
    }

    pub fn with_touched_fields(mut self, fields: Vec<String>) -> Self {
        self.touched_fields = Some(fields);
        self
    }
}

/// Transient per-mutation state between the before- and after-phase.
///
/// Produced by a before hook, owned by the mutation in progress, consumed
/// by the matching after hook once the underlying row change committed.
#[derive(Debug, Clone)]
pub struct PendingAudit {
    pub operation: Operation,
    pub delta: Delta,
    /// The newly stamped revision number.
    pub revision: i64,
}

/// Descriptor for a tracked-record type being registered.
#[derive(Debug, Clone)]
pub struct TrackedModel {
    pub name: String,
}

impl TrackedModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One-to-many association from the tracked model to its revision rows,
/// scoped by model name so several tracked types can share one table.
#[derive(Debug, Clone)]
pub struct Association {
    pub from_model: String,
    pub to_model: String,
    pub foreign_key: String,
    pub scope_model: String,
}

/// Derived layout of the audit tables, for the host to define its
/// persisted row types from.
#[derive(Debug, Clone)]
pub struct RevisionSchema {
    pub revision_table: String,
    /// Present only when per-field change rows are enabled.
    pub change_table: Option<String>,
    pub document_id_column: String,
    pub revision_id_column: String,
    pub actor_column: String,
    pub revision_column: String,
    /// UUID primary keys instead of integers.
    pub uuid_ids: bool,
    /// Document/diff columns are sized text instead of native JSON.
    pub text_documents: bool,
    pub association: Association,
}

/// The lifecycle hook bundle for one registered tracked-record type.
///
/// The host invokes the before hook in its before-mutation phase, commits
/// the row change, then invokes the matching after hook with the returned
/// [`PendingAudit`] and the same transaction.
pub struct AuditHooks<S: RevisionStore> {
    config: TrailConfig,
    store: S,
}

/// Install audit capture for a tracked-record type: returns the hook
/// bundle and the derived audit-table schema, including the association
/// from the tracked model to its revisions.
pub fn register<S: RevisionStore>(
    model: &TrackedModel,
    config: TrailConfig,
    store: S,
) -> (AuditHooks<S>, RevisionSchema) {
    debug!(model = %model.name, "enabling audit trail");
    let schema = RevisionSchema {
        revision_table: config.revision_model.clone(),
        change_table: config
            .enable_revision_change
            .then(|| config.revision_change_model.clone()),
        document_id_column: config.attributes.document_id.clone(),
        revision_id_column: config.attributes.revision_id.clone(),
        actor_column: config.actor_attribute.clone(),
        revision_column: config.revision_attribute.clone(),
        uuid_ids: config.uuid_ids,
        text_documents: config.text_documents,
        association: Association {
            from_model: model.name.clone(),
            to_model: config.revision_model.clone(),
            foreign_key: config.attributes.document_id.clone(),
            scope_model: model.name.clone(),
        },
    };
    (AuditHooks { config, store }, schema)
}

impl<S: RevisionStore> AuditHooks<S> {
    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// The backing store, for transaction control and queries.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn before_create(
        &self,
        record: &mut dyn TrackedRecord,
        opts: &MutationOptions,
    ) -> Result<Option<PendingAudit>, AuditError> {
        self.before(Operation::Create, record, opts)
    }

    pub fn before_update(
        &self,
        record: &mut dyn TrackedRecord,
        opts: &MutationOptions,
    ) -> Result<Option<PendingAudit>, AuditError> {
        self.before(Operation::Update, record, opts)
    }

    pub fn before_destroy(
        &self,
        record: &mut dyn TrackedRecord,
        opts: &MutationOptions,
    ) -> Result<Option<PendingAudit>, AuditError> {
        self.before(Operation::Destroy, record, opts)
    }

    pub fn after_create(
        &self,
        record: &dyn TrackedRecord,
        opts: &MutationOptions,
        ctx: Option<&ActorContext>,
        pending: Option<PendingAudit>,
        tx: &mut S::Tx,
    ) -> Result<Option<Revision>, AuditError> {
        self.after(record, opts, ctx, pending, tx)
    }

    pub fn after_update(
        &self,
        record: &dyn TrackedRecord,
        opts: &MutationOptions,
        ctx: Option<&ActorContext>,
        pending: Option<PendingAudit>,
        tx: &mut S::Tx,
    ) -> Result<Option<Revision>, AuditError> {
        self.after(record, opts, ctx, pending, tx)
    }

    pub fn after_destroy(
        &self,
        record: &dyn TrackedRecord,
        opts: &MutationOptions,
        ctx: Option<&ActorContext>,
        pending: Option<PendingAudit>,
        tx: &mut S::Tx,
    ) -> Result<Option<Revision>, AuditError> {
        self.after(record, opts, ctx, pending, tx)
    }

    /// Bulk-create before phase: every row becomes its own first
    /// revision, stamped unconditionally with no delta computation.
    pub fn before_bulk_create<R: TrackedRecord>(&self, records: &mut [R], opts: &MutationOptions) {
        if opts.opt_out {
            debug!("opt-out set, skipping bulk capture");
            return;
        }
        for record in records.iter_mut() {
            record.set_field(&self.config.revision_attribute, Value::from(1));
        }
    }

    /// Bulk-create after phase: one revision row per created record.
    pub fn after_bulk_create<R: TrackedRecord>(
        &self,
        records: &[R],
        opts: &MutationOptions,
        ctx: Option<&ActorContext>,
        tx: &mut S::Tx,
    ) -> Result<Vec<Revision>, AuditError> {
        if opts.opt_out {
            return Ok(Vec::new());
        }
        let actor = ResolvedActor::resolve(ctx, opts.actor_id.as_deref(), opts.metadata.as_ref());
        actor.validate_required(&self.config.meta_fields, self.config.policy)?;

        let persister = AuditPersister::new(&self.config, &self.store);
        let mut revisions = Vec::with_capacity(records.len());
        for record in records {
            let pending = PendingAudit {
                operation: Operation::Create,
                delta: Delta::new(),
                revision: 1,
            };
            revisions.push(persister.persist(record, &pending, &actor, None, tx)?);
        }
        Ok(revisions)
    }

    fn before(
        &self,
        operation: Operation,
        record: &mut dyn TrackedRecord,
        opts: &MutationOptions,
    ) -> Result<Option<PendingAudit>, AuditError> {
        if opts.opt_out {
            debug!(model = %record.model_name(), "opt-out set, skipping capture");
            return Ok(None);
        }

        // Destroy always diffs the full state; compression only narrows
        // create/update snapshots.
        let only = if operation == Operation::Destroy {
            None
        } else {
            self.config
                .enable_compression
                .then_some(opts.touched_fields.as_deref())
                .flatten()
        };
        let previous = normalize(record.previous_values(), &self.config.exclude, only);
        let current = normalize(record.current_values(), &self.config.exclude, only);

        // Disallow caller-supplied changes of the revision counter: clamp
        // it back to the previously stamped value before deciding.
        let stamped = record
            .previous_values()
            .get(&self.config.revision_attribute)
            .and_then(Value::as_i64);
        record.set_field(
            &self.config.revision_attribute,
            stamped.map_or(Value::Null, Value::from),
        );

        let delta = diff(&previous, &current, self.config.strict_diff);
        debug!(
            model = %record.model_name(),
            record = %record.record_id(),
            %operation,
            entries = delta.len(),
            "delta computed"
        );

        let next = next_revision(
            operation,
            &delta,
            stamped,
            self.config.policy,
            record.model_name(),
            record.record_id(),
        )?;

        Ok(next.map(|number| {
            record.set_field(&self.config.revision_attribute, Value::from(number));
            PendingAudit {
                operation,
                delta,
                revision: number,
            }
        }))
    }

    fn after(
        &self,
        record: &dyn TrackedRecord,
        opts: &MutationOptions,
        ctx: Option<&ActorContext>,
        pending: Option<PendingAudit>,
        tx: &mut S::Tx,
    ) -> Result<Option<Revision>, AuditError> {
        if opts.opt_out {
            return Ok(None);
        }
        let Some(pending) = pending else {
            debug!(model = %record.model_name(), "no audit-worthy change");
            return Ok(None);
        };

        let actor = ResolvedActor::resolve(ctx, opts.actor_id.as_deref(), opts.metadata.as_ref());
        actor.validate_required(&self.config.meta_fields, self.config.policy)?;
        actor.require_actor(
            pending.operation,
            record.model_name(),
            record.record_id(),
            self.config.policy,
        )?;

        let persister = AuditPersister::new(&self.config, &self.store);
        let revision = persister.persist(
            record,
            &pending,
            &actor,
            opts.touched_fields.as_deref(),
            tx,
        )?;
        Ok(Some(revision))
    }
}
