use crate::{Delta, StrictnessPolicy, TrailError};
use revtrail_common::{Operation, RowId};

/// Decide whether a mutation is audit-worthy and compute the next
/// revision number for the record.
///
/// Returns `Ok(None)` when no audit event is warranted (the mutation
/// proceeds without a revision row), `Ok(Some(n))` with the number to
/// stamp otherwise.
///
/// - `create` is always seeded at 1. Bulk-create bypasses this function
///   entirely; the bulk hooks force 1 with no delta computation.
/// - `update` is audit-worthy only when the delta is non-empty. A missing
///   stamped number is treated as 0 before incrementing, except under
///   fail-hard where it aborts the mutation: the record was never put
///   under version control.
/// - `destroy` is always audit-worthy regardless of delta.
pub fn next_revision(
    operation: Operation,
    delta: &Delta,
    stamped: Option<i64>,
    policy: StrictnessPolicy,
    model: &str,
    id: RowId,
) -> Result<Option<i64>, TrailError> {
    match operation {
        Operation::Create => Ok(Some(1)),
        Operation::Update => {
            if policy.fail_hard() && stamped.is_none() {
                return Err(TrailError::MissingRevision {
                    model: model.to_string(),
                    id: id.to_string(),
                });
            }
            if delta.is_empty() {
                Ok(None)
            } else {
                Ok(Some(stamped.unwrap_or(0) + 1))
            }
        }
        Operation::Destroy => Ok(Some(stamped.unwrap_or(0) + 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeltaEntry;
    use serde_json::json;

    fn one_change() -> Delta {
        vec![DeltaEntry::Edited {
            path: vec!["name".to_string()],
            lhs: json!("a"),
            rhs: json!("b"),
        }]
    }

    fn next(
        op: Operation,
        delta: &Delta,
        stamped: Option<i64>,
        policy: StrictnessPolicy,
    ) -> Result<Option<i64>, TrailError> {
        next_revision(op, delta, stamped, policy, "Item", RowId::from(1))
    }

    #[test]
    fn create_always_seeds_one() {
        let got = next(Operation::Create, &Delta::new(), None, StrictnessPolicy::Permissive);
        assert_eq!(got.unwrap(), Some(1));
    }

    #[test]
    fn update_increments_on_change() {
        let got = next(
            Operation::Update,
            &one_change(),
            Some(4),
            StrictnessPolicy::Permissive,
        );
        assert_eq!(got.unwrap(), Some(5));
    }

    #[test]
    fn update_missing_stamp_counts_from_zero() {
        let got = next(
            Operation::Update,
            &one_change(),
            None,
            StrictnessPolicy::Permissive,
        );
        assert_eq!(got.unwrap(), Some(1));
    }

    #[test]
    fn update_without_change_is_skipped() {
        let got = next(
            Operation::Update,
            &Delta::new(),
            Some(4),
            StrictnessPolicy::Permissive,
        );
        assert_eq!(got.unwrap(), None);
    }

    #[test]
    fn fail_hard_rejects_unstamped_update() {
        let got = next(
            Operation::Update,
            &Delta::new(),
            None,
            StrictnessPolicy::FailHard,
        );
        assert!(matches!(got, Err(TrailError::MissingRevision { .. })));
    }

    #[test]
    fn destroy_always_audited() {
        let got = next(
            Operation::Destroy,
            &Delta::new(),
            Some(2),
            StrictnessPolicy::FailHard,
        );
        assert_eq!(got.unwrap(), Some(3));
    }
}
