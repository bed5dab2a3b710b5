use crate::revision::{NewRevision, NewRevisionChange, Revision, RevisionChange};
use crate::store::{RevisionStore, StoreError};
use chrono::Utc;
use revtrail_common::RowId;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Transactional in-memory revision store.
///
/// Workaround: keeps audit rows in memory instead of a database. Real
/// hosts implement [`RevisionStore`] over their own connection and
/// transaction types; this one backs tests and the demo binary while
/// preserving the same atomicity contract: rows staged in a
/// [`MemoryTx`] only become visible on [`MemoryStore::commit`], and
/// dropping the transaction discards them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    uuid_ids: bool,
    next_id: AtomicI64,
    inner: Mutex<Committed>,
}

#[derive(Debug, Default)]
struct Committed {
    revisions: Vec<Revision>,
    changes: Vec<RevisionChange>,
}

/// Staged writes for one mutation. Commit publishes them atomically;
/// drop rolls them back.
#[derive(Debug, Default)]
pub struct MemoryTx {
    revisions: Vec<Revision>,
    changes: Vec<RevisionChange>,
}

impl MemoryStore {
    /// Store with sequential integer ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with generated UUID ids.
    pub fn with_uuid_ids() -> Self {
        Self {
            uuid_ids: true,
            ..Self::default()
        }
    }

    pub fn begin(&self) -> MemoryTx {
        MemoryTx::default()
    }

    /// Publish all staged rows. Id allocation already happened at insert
    /// time, so sequences may have gaps after a rollback, as they would
    /// in a real database.
    pub fn commit(&self, tx: MemoryTx) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.revisions.extend(tx.revisions);
        inner.changes.extend(tx.changes);
    }

    /// All committed revision rows, in insertion order.
    pub fn revisions(&self) -> Vec<Revision> {
        self.inner.lock().expect("store lock poisoned").revisions.clone()
    }

    /// Committed revisions for one tracked record.
    pub fn revisions_for(&self, record: RowId) -> Vec<Revision> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .revisions
            .iter()
            .filter(|r| r.document_id == record)
            .cloned()
            .collect()
    }

    /// Committed change rows belonging to one revision.
    pub fn changes_for(&self, revision: RowId) -> Vec<RevisionChange> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .changes
            .iter()
            .filter(|c| c.revision_id == revision)
            .cloned()
            .collect()
    }

    fn alloc_id(&self) -> RowId {
        if self.uuid_ids {
            RowId::new_uuid()
        } else {
            RowId::Int(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
        }
    }
}

impl RevisionStore for MemoryStore {
    type Tx = MemoryTx;

    fn insert_revision(
        &self,
        tx: &mut Self::Tx,
        revision: NewRevision,
    ) -> Result<Revision, StoreError> {
        let row = Revision {
            id: self.alloc_id(),
            model: revision.model,
            document_id: revision.document_id,
            actor_id: revision.actor_id,
            revision: revision.revision,
            operation: revision.operation,
            document: revision.document,
            metadata: revision.metadata,
            created_at: Utc::now(),
        };
        tx.revisions.push(row.clone());
        Ok(row)
    }

    fn insert_change(
        &self,
        tx: &mut Self::Tx,
        change: NewRevisionChange,
    ) -> Result<RevisionChange, StoreError> {
        let row = RevisionChange {
            id: self.alloc_id(),
            revision_id: change.revision_id,
            path: change.path,
            document: change.document,
            diff: change.diff,
            created_at: Utc::now(),
        };
        tx.changes.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::Document;
    use revtrail_common::{FieldMap, Operation};
    use serde_json::json;

    fn new_revision(record: i64, number: i64) -> NewRevision {
        NewRevision {
            model: "Item".to_string(),
            document_id: RowId::from(record),
            actor_id: Some("alice".to_string()),
            revision: number,
            operation: Operation::Update,
            document: Document::Json(json!({"name": "a"})),
            metadata: FieldMap::new(),
        }
    }

    #[test]
    fn staged_rows_invisible_until_commit() {
        let store = MemoryStore::new();
        let mut tx = store.begin();
        store.insert_revision(&mut tx, new_revision(1, 1)).unwrap();
        assert!(store.revisions().is_empty());

        store.commit(tx);
        assert_eq!(store.revisions().len(), 1);
    }

    #[test]
    fn dropped_tx_rolls_back() {
        let store = MemoryStore::new();
        let mut tx = store.begin();
        store.insert_revision(&mut tx, new_revision(1, 1)).unwrap();
        drop(tx);
        assert!(store.revisions().is_empty());
    }

    #[test]
    fn sequential_ids_assigned_at_insert() {
        let store = MemoryStore::new();
        let mut tx = store.begin();
        let a = store.insert_revision(&mut tx, new_revision(1, 1)).unwrap();
        let b = store.insert_revision(&mut tx, new_revision(2, 1)).unwrap();
        assert_eq!(a.id, RowId::from(1));
        assert_eq!(b.id, RowId::from(2));
    }

    #[test]
    fn uuid_mode_assigns_uuids() {
        let store = MemoryStore::with_uuid_ids();
        let mut tx = store.begin();
        let row = store.insert_revision(&mut tx, new_revision(1, 1)).unwrap();
        assert!(matches!(row.id, RowId::Uuid(_)));
    }

    #[test]
    fn queries_filter_by_owner() {
        let store = MemoryStore::new();
        let mut tx = store.begin();
        let rev = store.insert_revision(&mut tx, new_revision(7, 1)).unwrap();
        store.insert_revision(&mut tx, new_revision(8, 1)).unwrap();
        store
            .insert_change(
                &mut tx,
                NewRevisionChange {
                    revision_id: rev.id,
                    path: "name".to_string(),
                    document: Document::Json(json!({})),
                    diff: Document::Json(json!([])),
                },
            )
            .unwrap();
        store.commit(tx);

        assert_eq!(store.revisions_for(RowId::from(7)).len(), 1);
        assert_eq!(store.changes_for(rev.id).len(), 1);
        assert!(store.changes_for(RowId::from(999)).is_empty());
    }
}
