//! Transaction store port

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{NewTransaction, Transaction, TransactionPatch};

/// Persistence abstraction for transactions
///
/// Adapters own date/datetime conversion: whatever they store, `list` and
/// `get` hand back calendar dates.
pub trait TransactionStore: Send + Sync {
    /// All transactions belonging to `owner`, in no particular order
    fn list(&self, owner: &str) -> Result<Vec<Transaction>>;

    /// Get a transaction by id
    fn get(&self, id: Uuid) -> Result<Option<Transaction>>;

    /// Persist a draft and return the id the store assigned
    fn create(&self, draft: &NewTransaction) -> Result<Uuid>;

    /// Apply a partial update; a missing id is `NotFound`
    fn update(&self, id: Uuid, patch: &TransactionPatch) -> Result<()>;

    /// Delete a transaction; a missing id is `NotFound`
    fn delete(&self, id: Uuid) -> Result<()>;
}
