//! DuckDB transaction store

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    parse_stored_date, NewTransaction, ReferencePeriod, Transaction, TransactionKind,
    TransactionPatch, TransactionStatus,
};
use crate::ports::TransactionStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const SELECT_COLUMNS: &str = "transaction_id, owner, kind, occurred_at::VARCHAR, reference_period,
     category, description, amount::VARCHAR, status, recurring,
     created_at::VARCHAR, updated_at::VARCHAR";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock")
}

/// Transaction store backed by a DuckDB file
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (or create) the database at `db_path` and apply pending migrations
    ///
    /// Lock errors from a concurrently running process are retried with
    /// exponential backoff before giving up.
    pub fn open(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    let store = Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    };
                    store.run_migrations()?;
                    return Ok(store);
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            error = %err_msg,
                            "database busy, retrying"
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// A throwaway store living in memory, with the schema applied
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off: nothing here needs one
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Apply pending schema migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn).run_pending()
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock error: {}", e)))
    }

    fn query(&self, conn: &Connection, sql: &str, param: &str) -> Result<Vec<Transaction>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([param], RawRow::from_row)?;

        let mut txs = Vec::new();
        for row in rows {
            txs.push(row?.into_transaction()?);
        }
        Ok(txs)
    }

    fn get_locked(&self, conn: &Connection, id: Uuid) -> Result<Option<Transaction>> {
        let sql = format!(
            "SELECT {} FROM sys_transactions WHERE transaction_id = ?",
            SELECT_COLUMNS
        );
        Ok(self.query(conn, &sql, &id.to_string())?.into_iter().next())
    }
}

impl TransactionStore for DuckDbStore {
    fn list(&self, owner: &str) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM sys_transactions WHERE owner = ? ORDER BY occurred_at, created_at",
            SELECT_COLUMNS
        );
        self.query(&conn, &sql, owner)
    }

    fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        self.get_locked(&conn, id)
    }

    fn create(&self, draft: &NewTransaction) -> Result<Uuid> {
        let conn = self.conn()?;
        let id = Uuid::new_v4();
        let now = format_timestamp(Utc::now());

        conn.execute(
            "INSERT INTO sys_transactions (
                transaction_id, owner, kind, occurred_at, reference_period, category,
                description, amount, status, recurring, created_at, updated_at
             ) VALUES (?, ?, ?, CAST(? AS TIMESTAMP), ?, ?, ?, CAST(? AS DECIMAL(18, 2)), ?, ?,
                       CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP))",
            params![
                id.to_string(),
                draft.owner,
                draft.kind.as_str(),
                format_date(draft.occurred_on),
                draft.reference_period.to_string(),
                draft.category,
                draft.description,
                draft.amount.to_string(),
                draft.status.as_str(),
                draft.recurring,
                now,
                now,
            ],
        )?;

        Ok(id)
    }

    fn update(&self, id: Uuid, patch: &TransactionPatch) -> Result<()> {
        let conn = self.conn()?;
        let mut tx = self
            .get_locked(&conn, id)?
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))?;
        tx.apply(patch);

        conn.execute(
            "UPDATE sys_transactions SET
                kind = ?, occurred_at = CAST(? AS TIMESTAMP), reference_period = ?,
                category = ?, description = ?, amount = CAST(? AS DECIMAL(18, 2)),
                status = ?, recurring = ?, updated_at = CAST(? AS TIMESTAMP)
             WHERE transaction_id = ?",
            params![
                tx.kind.as_str(),
                format_date(tx.occurred_on),
                tx.reference_period.to_string(),
                tx.category,
                tx.description,
                tx.amount.to_string(),
                tx.status.as_str(),
                tx.recurring,
                format_timestamp(Utc::now()),
                id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM sys_transactions WHERE transaction_id = ?",
            [id.to_string()],
        )?;
        if deleted == 0 {
            return Err(Error::not_found(format!("transaction {}", id)));
        }
        Ok(())
    }
}

/// Column values as DuckDB hands them back, before domain parsing
struct RawRow {
    id: String,
    owner: String,
    kind: String,
    occurred_at: String,
    reference_period: String,
    category: String,
    description: String,
    amount: String,
    status: String,
    recurring: bool,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn from_row(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            kind: row.get(2)?,
            occurred_at: row.get(3)?,
            reference_period: row.get(4)?,
            category: row.get(5)?,
            description: row.get(6)?,
            amount: row.get(7)?,
            status: row.get(8)?,
            recurring: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    /// Parse into a domain transaction; anything unreadable is a data integrity error
    fn into_transaction(self) -> Result<Transaction> {
        let id = Uuid::parse_str(&self.id).map_err(|_| {
            Error::data_integrity(format!("invalid transaction id '{}'", self.id))
        })?;
        let kind = TransactionKind::from_str(&self.kind)
            .map_err(|_| Error::data_integrity(format!("invalid kind '{}' on {}", self.kind, id)))?;
        let status = TransactionStatus::from_str(&self.status).map_err(|_| {
            Error::data_integrity(format!("invalid status '{}' on {}", self.status, id))
        })?;
        let amount = Decimal::from_str(&self.amount).map_err(|_| {
            Error::data_integrity(format!("invalid amount '{}' on {}", self.amount, id))
        })?;

        Ok(Transaction {
            id,
            owner: self.owner,
            kind,
            occurred_on: parse_stored_date(&self.occurred_at)?,
            reference_period: ReferencePeriod::from_str(&self.reference_period)?,
            category: self.category,
            description: self.description,
            amount,
            status,
            recurring: self.recurring,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d 00:00:00").to_string()
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::data_integrity(format!("invalid timestamp '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewTransaction {
        let occurred_on = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        NewTransaction {
            owner: "local".to_string(),
            kind: TransactionKind::Expense,
            occurred_on,
            reference_period: ReferencePeriod::from_date(occurred_on),
            category: "Internet".to_string(),
            description: "Internet".to_string(),
            amount: Decimal::new(12000, 2),
            status: TransactionStatus::Paid,
            recurring: true,
        }
    }

    #[test]
    fn test_create_get_round_trip() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let id = store.create(&draft()).unwrap();

        let tx = store.get(id).unwrap().unwrap();
        assert_eq!(tx.to_new(), draft());
        assert_eq!(tx.amount.to_string(), "120.00");
    }

    #[test]
    fn test_amount_keeps_cents() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let mut d = draft();
        d.amount = Decimal::new(1999, 2);
        let id = store.create(&d).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().amount, Decimal::new(1999, 2));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let result = store.update(Uuid::new_v4(), &TransactionPatch::default());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp("2026-01-31 10:00:00").is_ok());
        assert!(parse_timestamp("2026-01-31 10:00:00.123456").is_ok());
        assert!(parse_timestamp("2026-01-31T10:00:00+00:00").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Could not set lock on file"));
        assert!(!is_retryable_error("Catalog Error: Table does not exist"));
    }
}
