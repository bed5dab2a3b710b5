use crate::{FieldMap, RowId};
use serde_json::Value;

/// The boundary to a row under audit, owned by the host persistence layer.
///
/// The engine only reads the previous/current field maps and the record
/// identifier, and writes back the revision counter field. It never owns
/// the record's lifecycle.
pub trait TrackedRecord {
    /// Name of the model/table this record belongs to.
    fn model_name(&self) -> &str;

    /// Identifier of the record itself.
    fn record_id(&self) -> RowId;

    /// Field values as they were before the in-flight mutation.
    fn previous_values(&self) -> &FieldMap;

    /// Field values as they will be after the in-flight mutation.
    fn current_values(&self) -> &FieldMap;

    /// Overwrite a single current field value. Used by the sequencer to
    /// clamp and then stamp the revision counter.
    fn set_field(&mut self, name: &str, value: Value);
}

/// A plain owned `TrackedRecord` backed by two field maps.
///
/// Real hosts implement [`TrackedRecord`] on their own entity types; this
/// one backs the demo binary and tests.
#[derive(Debug, Clone)]
pub struct BasicRecord {
    model: String,
    id: RowId,
    previous: FieldMap,
    current: FieldMap,
}

impl BasicRecord {
    pub fn new(model: impl Into<String>, id: impl Into<RowId>, current: FieldMap) -> Self {
        Self {
            model: model.into(),
            id: id.into(),
            previous: FieldMap::new(),
            current,
        }
    }

    /// Roll the current state into the previous state, then apply the
    /// given field changes. Mimics a host ORM beginning a new mutation.
    pub fn begin_mutation(&mut self, changes: FieldMap) {
        self.previous = self.current.clone();
        for (k, v) in changes {
            self.current.insert(k, v);
        }
    }
}

impl TrackedRecord for BasicRecord {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn record_id(&self) -> RowId {
        self.id
    }

    fn previous_values(&self) -> &FieldMap {
        &self.previous
    }

    fn current_values(&self) -> &FieldMap {
        &self.current
    }

    fn set_field(&mut self, name: &str, value: Value) {
        self.current.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn begin_mutation_shifts_states() {
        let mut rec = BasicRecord::new("Item", 1, fields(&[("name", json!("a"))]));
        rec.begin_mutation(fields(&[("name", json!("b"))]));

        assert_eq!(rec.previous_values()["name"], json!("a"));
        assert_eq!(rec.current_values()["name"], json!("b"));
    }

    #[test]
    fn set_field_only_touches_current() {
        let mut rec = BasicRecord::new("Item", 1, fields(&[("revision", json!(3))]));
        rec.begin_mutation(FieldMap::new());
        rec.set_field("revision", json!(4));

        assert_eq!(rec.previous_values()["revision"], json!(3));
        assert_eq!(rec.current_values()["revision"], json!(4));
    }
}
