//! Session - application state for one run of a consumer
//!
//! The recurrence pass runs lazily, at most once per session, before the
//! first command that needs up-to-date data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::result::Result;
use crate::services::{RecurrenceReport, RecurrenceService};

pub struct Session {
    recurrence: Arc<RecurrenceService>,
    bootstrapped: AtomicBool,
}

impl Session {
    pub fn new(recurrence: Arc<RecurrenceService>) -> Self {
        Self {
            recurrence,
            bootstrapped: AtomicBool::new(false),
        }
    }

    /// Run the recurrence pass if this session has not run it yet
    ///
    /// Returns the report of that run, or `None` when it already happened.
    /// A failed pass may be retried by calling again.
    pub fn bootstrap(&self) -> Result<Option<RecurrenceReport>> {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        match self.recurrence.run() {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                self.bootstrapped.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::{NewTransaction, ReferencePeriod, TransactionKind, TransactionStatus};
    use crate::ports::{FixedClock, TransactionStore};

    #[test]
    fn test_bootstrap_runs_once() {
        let store = Arc::new(MemoryStore::new());
        let occurred_on = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        store
            .create(&NewTransaction {
                owner: "local".to_string(),
                kind: TransactionKind::Expense,
                occurred_on,
                reference_period: ReferencePeriod::from_date(occurred_on),
                category: "Internet".to_string(),
                description: "Internet".to_string(),
                amount: Decimal::new(12000, 2),
                status: TransactionStatus::Paid,
                recurring: true,
            })
            .unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let recurrence = RecurrenceService::new(store.clone(), Arc::new(FixedClock(today)), "local");
        let session = Session::new(Arc::new(recurrence));

        assert!(!session.is_bootstrapped());
        let report = session.bootstrap().unwrap().unwrap();
        assert_eq!(report.created.len(), 1);
        assert!(session.bootstrap().unwrap().is_none());
        assert_eq!(store.list("local").unwrap().len(), 2);
    }
}
