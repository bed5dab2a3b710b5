use chrono::{DateTime, Utc};
use revtrail_common::{FieldMap, Operation, RowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A serialized document column.
///
/// Stored as native structured JSON where the backend supports it, or as
/// text when configured for backends without structured-document columns
/// (text fields must be sized for the larger encoded payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Document {
    Json(Value),
    Text(String),
}

impl Document {
    /// Encode a value according to the configured storage mode.
    pub fn encode(value: Value, text_mode: bool) -> Self {
        if text_mode {
            Self::Text(value.to_string())
        } else {
            Self::Json(value)
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

/// An immutable audit row recording one audit-worthy mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Revision {
    pub id: RowId,
    /// Name of the tracked model this revision belongs to.
    pub model: String,
    /// Foreign key to the tracked record.
    pub document_id: RowId,
    pub actor_id: Option<String>,
    /// Monotonic per-record revision number.
    pub revision: i64,
    pub operation: Operation,
    /// Post-mutation state for create/update, last-known state for destroy.
    pub document: Document,
    /// Resolved extra metadata columns.
    pub metadata: FieldMap,
    pub created_at: DateTime<Utc>,
}

/// A revision row as handed to the store, before id/timestamp assignment.
#[derive(Debug, Clone)]
pub struct NewRevision {
    pub model: String,
    pub document_id: RowId,
    pub actor_id: Option<String>,
    pub revision: i64,
    pub operation: Operation,
    pub document: Document,
    pub metadata: FieldMap,
}

/// A persisted per-field diff row, owned by one revision.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionChange {
    pub id: RowId,
    /// Foreign key to the owning revision.
    pub revision_id: RowId,
    /// Top-level field path of the difference.
    pub path: String,
    /// The full delta entry in document form.
    pub document: Document,
    /// Character-level diff of the human-readable lhs/rhs forms.
    pub diff: Document,
    pub created_at: DateTime<Utc>,
}

/// A change row as handed to the store.
#[derive(Debug, Clone)]
pub struct NewRevisionChange {
    pub revision_id: RowId,
    pub path: String,
    pub document: Document,
    pub diff: Document,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_json_mode_keeps_structure() {
        let doc = Document::encode(json!({"name": "a"}), false);
        assert_eq!(doc.as_json(), Some(&json!({"name": "a"})));
        assert!(doc.as_text().is_none());
    }

    #[test]
    fn encode_text_mode_serializes() {
        let doc = Document::encode(json!({"name": "a"}), true);
        assert_eq!(doc.as_text(), Some(r#"{"name":"a"}"#));
        assert!(doc.as_json().is_none());
    }
}
