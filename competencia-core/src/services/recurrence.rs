//! Recurrence service - replays recurring transactions into the current period
//!
//! Each period, every recurring transaction of the previous period is copied
//! once into the current one. A `(description, category)` signature already
//! present in the current period means the copy exists and is skipped.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{NewTransaction, ReferencePeriod, Signature, Transaction, TransactionStatus};
use crate::ports::{Clock, TransactionStore};

/// Outcome of one recurrence pass
#[derive(Debug, Clone, Serialize)]
pub struct RecurrenceReport {
    pub current_period: ReferencePeriod,
    pub previous_period: ReferencePeriod,
    pub created: Vec<Transaction>,
    pub skipped: Vec<SkippedRecurrence>,
    pub failed: Vec<RecurrenceFailure>,
}

impl RecurrenceReport {
    fn new(current_period: ReferencePeriod) -> Self {
        Self {
            current_period,
            previous_period: current_period.previous(),
            created: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// True when the pass neither created nor failed anything
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.failed.is_empty()
    }
}

/// A candidate whose signature already exists in the current period
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecurrence {
    pub source_id: Uuid,
    pub signature: Signature,
}

/// A candidate that could not be materialized
#[derive(Debug, Clone, Serialize)]
pub struct RecurrenceFailure {
    pub source_id: Uuid,
    pub signature: Signature,
    pub error: String,
}

pub struct RecurrenceService {
    store: Arc<dyn TransactionStore>,
    clock: Arc<dyn Clock>,
    owner: String,
}

impl RecurrenceService {
    pub fn new(store: Arc<dyn TransactionStore>, clock: Arc<dyn Clock>, owner: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            owner: owner.into(),
        }
    }

    /// List the owner's transactions and run a pass for the clock's today
    ///
    /// Only a failing `list` is an error; per-candidate failures land in the report.
    pub fn run(&self) -> Result<RecurrenceReport> {
        let all = self.store.list(&self.owner)?;
        Ok(self.materialize_recurring(&all, self.clock.today()))
    }

    /// Copy the previous period's recurring transactions into today's period
    pub fn materialize_recurring(&self, all: &[Transaction], today: NaiveDate) -> RecurrenceReport {
        let current_period = ReferencePeriod::from_date(today);
        let mut report = RecurrenceReport::new(current_period);
        let previous_period = report.previous_period;

        let mut existing: HashSet<Signature> = all
            .iter()
            .filter(|tx| tx.reference_period == current_period)
            .map(Transaction::signature)
            .collect();

        let candidates = all
            .iter()
            .filter(|tx| tx.recurring && tx.reference_period == previous_period);

        for source in candidates {
            let signature = source.signature();
            if existing.contains(&signature) {
                debug!(source = %source.id, period = %current_period, "recurrence already present");
                report.skipped.push(SkippedRecurrence {
                    source_id: source.id,
                    signature,
                });
                continue;
            }

            let draft = recurrence_draft(source, current_period);
            let created = draft.validate().and_then(|()| {
                let id = self.store.create(&draft)?;
                self.store
                    .get(id)?
                    .ok_or_else(|| Error::not_found(format!("transaction {}", id)))
            });

            match created {
                Ok(tx) => {
                    debug!(source = %source.id, created = %tx.id, "recurrence materialized");
                    existing.insert(signature);
                    report.created.push(tx);
                }
                Err(e) => {
                    warn!(source = %source.id, error = %e, "recurrence failed");
                    report.failed.push(RecurrenceFailure {
                        source_id: source.id,
                        signature,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !report.is_noop() {
            info!(
                period = %current_period,
                created = report.created.len(),
                failed = report.failed.len(),
                "recurrence pass finished"
            );
        }
        report
    }
}

/// The copy of `source` for the current period, day clamped to the month's end
fn recurrence_draft(source: &Transaction, current_period: ReferencePeriod) -> NewTransaction {
    NewTransaction {
        owner: source.owner.clone(),
        kind: source.kind,
        occurred_on: current_period.date_clamped(source.occurred_on.day()),
        reference_period: current_period,
        category: source.category.clone(),
        description: source.description.clone(),
        amount: source.amount,
        status: TransactionStatus::Pending,
        recurring: true,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::TransactionKind;
    use crate::ports::FixedClock;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn recurring(description: &str, category: &str, date: NaiveDate, amount: i64) -> NewTransaction {
        NewTransaction {
            owner: "local".to_string(),
            kind: TransactionKind::Expense,
            occurred_on: date,
            reference_period: ReferencePeriod::from_date(date),
            category: category.to_string(),
            description: description.to_string(),
            amount: Decimal::new(amount, 2),
            status: TransactionStatus::Paid,
            recurring: true,
        }
    }

    fn service(store: Arc<MemoryStore>, today: NaiveDate) -> RecurrenceService {
        RecurrenceService::new(store, Arc::new(FixedClock(today)), "local")
    }

    #[test]
    fn test_copies_previous_period_into_current() {
        let store = Arc::new(MemoryStore::new());
        store.create(&recurring("Internet", "Internet", ymd(2026, 1, 10), 12000)).unwrap();

        let report = service(store.clone(), ymd(2026, 2, 3)).run().unwrap();

        assert_eq!(report.current_period.to_string(), "Fevereiro 2026");
        assert_eq!(report.previous_period.to_string(), "Janeiro 2026");
        assert_eq!(report.created.len(), 1);
        let created = &report.created[0];
        assert_eq!(created.occurred_on, ymd(2026, 2, 10));
        assert_eq!(created.status, TransactionStatus::Pending);
        assert!(created.recurring);
        assert_eq!(created.amount, Decimal::new(12000, 2));
        assert_eq!(store.list("local").unwrap().len(), 2);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        store.create(&recurring("Aluguel", "Aluguel", ymd(2026, 1, 5), 150000)).unwrap();
        let service = service(store.clone(), ymd(2026, 2, 1));

        assert_eq!(service.run().unwrap().created.len(), 1);
        let second = service.run().unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped.len(), 1);
        assert_eq!(store.list("local").unwrap().len(), 2);
    }

    #[test]
    fn test_day_is_clamped_to_month_end() {
        let store = Arc::new(MemoryStore::new());
        store.create(&recurring("Energia", "Energia", ymd(2026, 1, 31), 9000)).unwrap();

        let report = service(store, ymd(2026, 2, 14)).run().unwrap();
        assert_eq!(report.created[0].occurred_on, ymd(2026, 2, 28));
    }

    #[test]
    fn test_january_replays_december() {
        let store = Arc::new(MemoryStore::new());
        store.create(&recurring("Saneago", "Saneago", ymd(2025, 12, 20), 8000)).unwrap();

        let report = service(store, ymd(2026, 1, 2)).run().unwrap();
        assert_eq!(report.previous_period.to_string(), "Dezembro 2025");
        assert_eq!(report.created[0].occurred_on, ymd(2026, 1, 20));
        assert_eq!(report.created[0].reference_period.to_string(), "Janeiro 2026");
    }

    #[test]
    fn test_duplicate_signatures_create_once() {
        let store = Arc::new(MemoryStore::new());
        store.create(&recurring("Cartão", "Cartão", ymd(2026, 1, 8), 50000)).unwrap();
        store.create(&recurring("Cartão", "Cartão", ymd(2026, 1, 15), 70000)).unwrap();

        let report = service(store.clone(), ymd(2026, 2, 1)).run().unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_non_recurring_and_older_periods_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut once = recurring("Mercado", "Outros", ymd(2026, 1, 8), 30000);
        once.recurring = false;
        store.create(&once).unwrap();
        store.create(&recurring("IPASGO", "IPASGO", ymd(2025, 11, 8), 30000)).unwrap();

        let report = service(store, ymd(2026, 2, 1)).run().unwrap();
        assert!(report.created.is_empty());
        assert!(report.is_noop());
    }

    #[test]
    fn test_invalid_candidate_does_not_stop_others() {
        let store = Arc::new(MemoryStore::new());
        store.create(&recurring("Legado", "Outros", ymd(2026, 1, 3), 0)).unwrap();
        store.create(&recurring("Internet", "Internet", ymd(2026, 1, 10), 12000)).unwrap();

        let report = service(store, ymd(2026, 2, 1)).run().unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].signature.description, "Legado");
        assert_eq!(report.created.len(), 1);
    }

    #[test]
    fn test_recurring_income_is_replayed() {
        let store = Arc::new(MemoryStore::new());
        let mut salary = recurring("Salário", "Salário", ymd(2026, 1, 5), 500000);
        salary.kind = TransactionKind::Income;
        salary.status = TransactionStatus::Received;
        store.create(&salary).unwrap();

        let report = service(store, ymd(2026, 2, 1)).run().unwrap();
        assert_eq!(report.created.len(), 1);
        let created = &report.created[0];
        assert_eq!(created.kind, TransactionKind::Income);
        assert_eq!(created.status, TransactionStatus::Pending);
        assert_eq!(created.reference_period.to_string(), "Fevereiro 2026");
    }

    #[test]
    fn test_one_off_with_same_signature_blocks_the_copy() {
        let store = Arc::new(MemoryStore::new());
        store.create(&recurring("Internet", "Internet", ymd(2026, 1, 10), 12000)).unwrap();
        // Entered by hand in February, not part of the chain
        let mut manual = recurring("Internet", "Internet", ymd(2026, 2, 2), 9900);
        manual.recurring = false;
        store.create(&manual).unwrap();

        let report = service(store.clone(), ymd(2026, 2, 3)).run().unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].signature.description, "Internet");
        assert_eq!(store.list("local").unwrap().len(), 2);
    }

    #[test]
    fn test_report_holds_the_stored_rows() {
        let store = Arc::new(MemoryStore::new());
        store.create(&recurring("Internet", "Internet", ymd(2026, 1, 10), 12000)).unwrap();

        let report = service(store.clone(), ymd(2026, 2, 3)).run().unwrap();
        let created = &report.created[0];
        assert_eq!(store.get(created.id).unwrap().as_ref(), Some(created));
    }
}
