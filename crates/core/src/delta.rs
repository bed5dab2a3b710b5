use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The ordered set of field-level differences between two snapshots.
/// Empty means "no audit-worthy change".
pub type Delta = Vec<DeltaEntry>;

/// One field-level difference.
///
/// Collection-valued fields produce one `Item` per differing element,
/// wrapping the element-level difference, so change rows can report
/// added/removed/changed items instead of treating the array as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeltaEntry {
    Added {
        path: Vec<String>,
        rhs: Value,
    },
    Removed {
        path: Vec<String>,
        lhs: Value,
    },
    Edited {
        path: Vec<String>,
        lhs: Value,
        rhs: Value,
    },
    Item {
        path: Vec<String>,
        index: usize,
        item: Box<DeltaEntry>,
    },
}

impl DeltaEntry {
    pub fn path(&self) -> &[String] {
        match self {
            Self::Added { path, .. }
            | Self::Removed { path, .. }
            | Self::Edited { path, .. }
            | Self::Item { path, .. } => path,
        }
    }

    /// The top-level field this difference belongs to.
    pub fn field(&self) -> &str {
        self.path().first().map(String::as_str).unwrap_or_default()
    }

    /// Previous value, unwrapping nested item wrappers.
    pub fn lhs(&self) -> Option<&Value> {
        match self {
            Self::Added { .. } => None,
            Self::Removed { lhs, .. } | Self::Edited { lhs, .. } => Some(lhs),
            Self::Item { item, .. } => item.lhs(),
        }
    }

    /// New value, unwrapping nested item wrappers.
    pub fn rhs(&self) -> Option<&Value> {
        match self {
            Self::Removed { .. } => None,
            Self::Added { rhs, .. } | Self::Edited { rhs, .. } => Some(rhs),
            Self::Item { item, .. } => item.rhs(),
        }
    }
}

/// Structural comparison of two normalized snapshots.
///
/// Output ordering follows the field order of `current`, then any fields
/// present only in `previous`. Pure function: same inputs produce the
/// identical delta, entry order included.
pub fn diff(previous: &Snapshot, current: &Snapshot, strict: bool) -> Delta {
    let mut delta = Delta::new();

    for (field, cur) in current.fields() {
        match previous.get(field) {
            None => delta.push(DeltaEntry::Added {
                path: vec![field.clone()],
                rhs: cur.clone(),
            }),
            Some(prev) => match (prev.as_array(), cur.as_array()) {
                (Some(prev_items), Some(cur_items)) => {
                    diff_array(field, prev_items, cur_items, strict, &mut delta);
                }
                _ => {
                    if !values_equal(prev, cur, strict) {
                        delta.push(DeltaEntry::Edited {
                            path: vec![field.clone()],
                            lhs: prev.clone(),
                            rhs: cur.clone(),
                        });
                    }
                }
            },
        }
    }

    for (field, prev) in previous.fields() {
        if current.get(field).is_none() {
            delta.push(DeltaEntry::Removed {
                path: vec![field.clone()],
                lhs: prev.clone(),
            });
        }
    }

    delta
}

fn diff_array(field: &str, previous: &[Value], current: &[Value], strict: bool, out: &mut Delta) {
    let len = previous.len().max(current.len());
    for index in 0..len {
        let item = match (previous.get(index), current.get(index)) {
            (Some(prev), Some(cur)) => {
                if values_equal(prev, cur, strict) {
                    continue;
                }
                DeltaEntry::Edited {
                    path: Vec::new(),
                    lhs: prev.clone(),
                    rhs: cur.clone(),
                }
            }
            (None, Some(cur)) => DeltaEntry::Added {
                path: Vec::new(),
                rhs: cur.clone(),
            },
            (Some(prev), None) => DeltaEntry::Removed {
                path: Vec::new(),
                lhs: prev.clone(),
            },
            (None, None) => continue,
        };
        out.push(DeltaEntry::Item {
            path: vec![field.to_string()],
            index,
            item: Box::new(item),
        });
    }
}

/// Value equality used by the delta engine.
///
/// Strict mode requires deep, type-exact equality. Loose mode addition-
/// ally treats scalars with the same rendering as equal, so a numeric
/// string compares equal to its number.
fn values_equal(a: &Value, b: &Value, strict: bool) -> bool {
    if a == b {
        return true;
    }
    if strict {
        return false;
    }
    match (scalar_text(a), scalar_text(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Human-readable form of a delta value, used when building the
/// character-level diff stored on change rows. Absent and null values
/// render as the empty string; strings render unquoted; everything else
/// renders as JSON text.
pub fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
