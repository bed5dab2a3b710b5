use revtrail_common::FieldMap;
use serde_json::Value;

/// The normalized, comparable field map derived from one record state.
///
/// Created fresh per mutation (once for the previous state, once for the
/// current), consumed by the delta engine, then discarded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot(FieldMap);

impl Snapshot {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The snapshot as a plain field map, for document serialization.
    pub fn into_inner(self) -> FieldMap {
        self.0
    }

    pub fn as_map(&self) -> &FieldMap {
        &self.0
    }
}

/// Extract the comparable field set from a raw record state.
///
/// Strips every field named in `exclude` and every value that is a
/// structured object (nested associations are not diffed by this engine;
/// arrays are kept so the delta engine can report per-item differences).
/// When `only` is given, just that subset of the state is drawn
/// (compression mode). Pure function.
pub fn normalize(state: &FieldMap, exclude: &[String], only: Option<&[String]>) -> Snapshot {
    let keep = |name: &str, value: &Value| -> bool {
        !exclude.iter().any(|e| e == name) && !value.is_object()
    };

    let map = match only {
        Some(fields) => fields
            .iter()
            .filter_map(|f| state.get_key_value(f.as_str()))
            .filter(|(k, v)| keep(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        None => state
            .iter()
            .filter(|(k, v)| keep(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };
    Snapshot(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(pairs: &[(&str, Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn excludes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strips_excluded_fields() {
        let s = state(&[("id", json!(1)), ("name", json!("a")), ("revision", json!(2))]);
        let snap = normalize(&s, &excludes(&["id", "revision"]), None);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get("name"), Some(&json!("a")));
    }

    #[test]
    fn strips_nested_objects_keeps_arrays() {
        let s = state(&[
            ("owner", json!({"id": 3, "name": "assoc"})),
            ("tags", json!(["a", "b"])),
            ("age", json!(30)),
        ]);
        let snap = normalize(&s, &[], None);
        assert!(snap.get("owner").is_none());
        assert_eq!(snap.get("tags"), Some(&json!(["a", "b"])));
        assert_eq!(snap.get("age"), Some(&json!(30)));
    }

    #[test]
    fn keeps_date_strings_and_nulls() {
        let s = state(&[
            ("seen_at", json!("2024-05-01T10:00:00Z")),
            ("note", Value::Null),
        ]);
        let snap = normalize(&s, &[], None);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn compression_draws_only_listed_fields() {
        let s = state(&[("name", json!("a")), ("age", json!(1)), ("city", json!("x"))]);
        let only = vec!["name".to_string(), "age".to_string()];
        let snap = normalize(&s, &[], Some(&only));
        assert_eq!(snap.len(), 2);
        assert!(snap.get("city").is_none());
    }

    #[test]
    fn compression_still_applies_exclusions() {
        let s = state(&[("name", json!("a")), ("revision", json!(1))]);
        let only = vec!["name".to_string(), "revision".to_string()];
        let snap = normalize(&s, &excludes(&["revision"]), Some(&only));
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn normalize_is_idempotent() {
        let s = state(&[
            ("name", json!("a")),
            ("nested", json!({"x": 1})),
            ("id", json!(9)),
        ]);
        let ex = excludes(&["id"]);
        let a = normalize(&s, &ex, None);
        let b = normalize(&s, &ex, None);
        assert_eq!(a, b);
        // Re-normalizing an already normalized map changes nothing.
        let again = normalize(a.as_map(), &ex, None);
        assert_eq!(again, b);
    }
}
