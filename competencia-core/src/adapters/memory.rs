//! Process-local transaction store

use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{NewTransaction, Transaction, TransactionPatch};
use crate::ports::TransactionStore;

/// Keeps transactions in a vector for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<std::sync::MutexGuard<'_, Vec<Transaction>>> {
        self.rows
            .lock()
            .map_err(|e| Error::database(format!("Lock error: {}", e)))
    }
}

impl TransactionStore for MemoryStore {
    fn list(&self, owner: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .rows()?
            .iter()
            .filter(|tx| tx.owner == owner)
            .cloned()
            .collect())
    }

    fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self.rows()?.iter().find(|tx| tx.id == id).cloned())
    }

    fn create(&self, draft: &NewTransaction) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.rows()?.push(Transaction::from_new(id, draft.clone()));
        Ok(id)
    }

    fn update(&self, id: Uuid, patch: &TransactionPatch) -> Result<()> {
        let mut rows = self.rows()?;
        let tx = rows
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))?;
        tx.apply(patch);
        tx.updated_at = Utc::now();
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let mut rows = self.rows()?;
        let before = rows.len();
        rows.retain(|tx| tx.id != id);
        if rows.len() == before {
            return Err(Error::not_found(format!("transaction {}", id)));
        }
        Ok(())
    }
}
