use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Field name to scalar/date value mapping for one record state.
///
/// Uses BTreeMap for deterministic iteration order across all platforms.
pub type FieldMap = BTreeMap<String, serde_json::Value>;

/// A generated row identifier: sequential integer or UUID depending on
/// how the backing store is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Uuid(Uuid),
}

impl RowId {
    /// Generate a fresh random UUID identifier.
    pub fn new_uuid() -> Self {
        Self::Uuid(Uuid::new_v4())
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for RowId {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<Uuid> for RowId {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{v}"),
        }
    }
}

/// The kind of mutation that produced an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Destroy,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a camelCase attribute name to its underscored form
/// (`documentId` -> `document_id`). Used when the host schema is
/// configured with snake-cased attribute naming.
pub fn to_underscored(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
