use crate::revision::{NewRevision, NewRevisionChange, Revision, RevisionChange};

/// Errors from the revision store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transaction is closed")]
    TransactionClosed,
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Write boundary to whatever actually stores audit rows.
///
/// Both inserts take the host's transaction handle for the originating
/// mutation, so the audit rows commit or roll back together with the row
/// change that produced them. The store assigns generated ids and
/// creation timestamps; inserted rows are immutable afterwards.
pub trait RevisionStore {
    type Tx;

    fn insert_revision(
        &self,
        tx: &mut Self::Tx,
        revision: NewRevision,
    ) -> Result<Revision, StoreError>;

    fn insert_change(
        &self,
        tx: &mut Self::Tx,
        change: NewRevisionChange,
    ) -> Result<RevisionChange, StoreError>;
}
