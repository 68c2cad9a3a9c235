use async_trait::async_trait;

use super::transactions_model::{
    NewTransaction, Page, PostedTransaction, Transaction, TransactionFilter, TransactionInput,
    TransactionPage,
};
use crate::errors::Result;

/// Read access to transaction rows. Rows are inserted by ledger postings only.
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction>;

    /// Returns the REVERSAL row pointing at `transaction_id`, if any.
    fn find_reversal_of(&self, transaction_id: &str) -> Result<Option<Transaction>>;

    /// Lists matching rows newest first (date, then creation time).
    fn list(&self, filter: &TransactionFilter, page: Page) -> Result<TransactionPage>;
}

#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Validates and posts a transaction atomically.
    async fn create_transaction(&self, new: NewTransaction) -> Result<PostedTransaction>;

    /// Converts a flat payload into a typed request, then posts it.
    async fn create_transaction_from_input(
        &self,
        input: TransactionInput,
    ) -> Result<PostedTransaction>;

    fn get_transaction(&self, club_id: &str, transaction_id: &str) -> Result<Transaction>;

    fn list_transactions(&self, filter: TransactionFilter, page: Page) -> Result<TransactionPage>;
}
