use revtrail_common::to_underscored;

/// Whether recoverable integrity gaps abort the mutation or degrade to a
/// logged, partial audit event.
///
/// Passed into the engine at construction rather than flipped on a global
/// at runtime, so two engines in one process can disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrictnessPolicy {
    #[default]
    Permissive,
    FailHard,
}

impl StrictnessPolicy {
    pub fn fail_hard(self) -> bool {
        self == Self::FailHard
    }
}

/// A declared extra metadata column on the revision row.
///
/// The value is resolved from the ambient [`ActorContext`](crate::ActorContext)
/// metadata first, then from the per-call override. A `required` field
/// that resolves to nothing is fatal under fail-hard.
#[derive(Debug, Clone)]
pub struct MetaField {
    pub name: String,
    pub required: bool,
}

impl MetaField {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Names of the engine-owned foreign-key attributes on the audit rows.
#[derive(Debug, Clone)]
pub struct AttributeNames {
    /// Foreign key from a revision row to the tracked record.
    pub document_id: String,
    /// Foreign key from a change row to its revision.
    pub revision_id: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            document_id: "documentId".to_string(),
            revision_id: "revisionId".to_string(),
        }
    }
}

/// Configuration for one registered audit trail.
#[derive(Debug, Clone)]
pub struct TrailConfig {
    /// Field names never included in snapshots or deltas.
    pub exclude: Vec<String>,
    /// Name of the revision counter field on the tracked record.
    pub revision_attribute: String,
    /// Model name for revision rows.
    pub revision_model: String,
    /// Model name for per-field change rows.
    pub revision_change_model: String,
    /// Persist one change row per changed field on updates.
    pub enable_revision_change: bool,
    /// Generate UUID ids for audit rows instead of sequential integers.
    pub uuid_ids: bool,
    /// Snake-cased table naming for the host schema.
    pub underscored: bool,
    /// Name of the actor id column on the revision row.
    pub actor_attribute: String,
    /// Engine-owned attribute names (see [`AttributeNames`]).
    pub attributes: AttributeNames,
    /// Diff only the per-call touched-field subset instead of the full
    /// state. Shrinks documents for wide, mostly untouched rows.
    pub enable_compression: bool,
    /// Exact value equality when diffing; loose scalar equality otherwise.
    pub strict_diff: bool,
    /// Encode documents as text for backends without native JSON columns.
    pub text_documents: bool,
    /// Extra metadata columns resolved onto each revision row.
    pub meta_fields: Vec<MetaField>,
    /// Integrity-gap handling, see [`StrictnessPolicy`].
    pub policy: StrictnessPolicy,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            exclude: [
                "id",
                "createdAt",
                "updatedAt",
                "deletedAt",
                "created_at",
                "updated_at",
                "deleted_at",
                "revision",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            revision_attribute: "revision".to_string(),
            revision_model: "Revision".to_string(),
            revision_change_model: "RevisionChange".to_string(),
            enable_revision_change: false,
            uuid_ids: false,
            underscored: false,
            actor_attribute: "userId".to_string(),
            attributes: AttributeNames::default(),
            enable_compression: false,
            strict_diff: true,
            text_documents: false,
            meta_fields: Vec::new(),
            policy: StrictnessPolicy::Permissive,
        }
    }
}

impl TrailConfig {
    /// Switch the engine-owned attribute names to their underscored forms
    /// (`documentId` -> `document_id`).
    pub fn with_underscored_attributes(mut self) -> Self {
        self.attributes.document_id = to_underscored(&self.attributes.document_id);
        self.attributes.revision_id = to_underscored(&self.attributes.revision_id);
        self.actor_attribute = to_underscored(&self.actor_attribute);
        self
    }

    /// Column names the primary revision contract already defines.
    /// Metadata may never overwrite these.
    pub fn reserved_columns(&self) -> Vec<&str> {
        vec![
            "model",
            "document",
            "operation",
            &self.revision_attribute,
            &self.attributes.document_id,
            &self.actor_attribute,
        ]
    }
}
