use async_trait::async_trait;

use super::ledger_model::LedgerPosting;
use crate::errors::Result;

/// Persists ledger postings.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Applies every change in `posting` inside one storage transaction.
    ///
    /// A version mismatch on a balance, position or membership, or a position
    /// inserted concurrently for the same (fund, asset), fails the whole
    /// posting with `DatabaseError::ConcurrentModification`.
    async fn commit(&self, posting: LedgerPosting) -> Result<()>;
}
