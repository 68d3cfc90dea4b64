//! Doctor service - reference period health checks
//!
//! Stored periods are derived data. When the shift table changes, rows
//! created under the old table keep their old period; the doctor finds and
//! rewrites them.
//!
//! Recurring rows stamped with their calendar month are left alone: the
//! recurrence pass puts copies in the period it runs for, and moving them
//! would hide them from the next pass.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{PeriodResolver, ReferencePeriod, Transaction, TransactionKind, TransactionPatch};
use crate::ports::TransactionStore;

/// A transaction whose stored period disagrees with the resolver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodDrift {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub occurred_on: NaiveDate,
    pub stored: ReferencePeriod,
    pub expected: ReferencePeriod,
}

pub struct DoctorService {
    store: Arc<dyn TransactionStore>,
    resolver: PeriodResolver,
    owner: String,
}

impl DoctorService {
    pub fn new(store: Arc<dyn TransactionStore>, resolver: PeriodResolver, owner: impl Into<String>) -> Self {
        Self {
            store,
            resolver,
            owner: owner.into(),
        }
    }

    pub fn check_periods(&self) -> Result<Vec<PeriodDrift>> {
        Ok(self
            .store
            .list(&self.owner)?
            .into_iter()
            .filter(|tx| !is_recurrence_copy(tx))
            .filter_map(|tx| {
                let expected = self.resolver.resolve(tx.occurred_on, &tx.category, tx.kind);
                (expected != tx.reference_period).then_some(PeriodDrift {
                    id: tx.id,
                    kind: tx.kind,
                    occurred_on: tx.occurred_on,
                    stored: tx.reference_period,
                    expected,
                })
            })
            .collect())
    }

    /// Rewrite every drifted period; returns how many were fixed
    pub fn fix_periods(&self) -> Result<usize> {
        let drifts = self.check_periods()?;
        for drift in &drifts {
            self.store.update(
                drift.id,
                &TransactionPatch {
                    reference_period: Some(drift.expected),
                    ..Default::default()
                },
            )?;
        }
        if !drifts.is_empty() {
            info!(fixed = drifts.len(), "reference periods rewritten");
        }
        Ok(drifts.len())
    }
}

/// A recurring row dated inside its own period, as the recurrence pass writes them
fn is_recurrence_copy(tx: &Transaction) -> bool {
    tx.recurring && tx.reference_period == ReferencePeriod::from_date(tx.occurred_on)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::{NewTransaction, PeriodShifts, TransactionStatus};

    #[test]
    fn test_detects_and_fixes_drift() {
        let store = Arc::new(MemoryStore::new());
        let occurred_on = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        // Stored before AC-4 was shifted
        let id = store
            .create(&NewTransaction {
                owner: "local".to_string(),
                kind: TransactionKind::Income,
                occurred_on,
                reference_period: ReferencePeriod::from_date(occurred_on),
                category: "AC-4".to_string(),
                description: "Auxílio".to_string(),
                amount: Decimal::new(800, 0),
                status: TransactionStatus::Received,
                recurring: false,
            })
            .unwrap();

        let doctor = DoctorService::new(store.clone(), PeriodResolver::new(PeriodShifts::default()), "local");
        let drifts = doctor.check_periods().unwrap();
        assert_eq!(drifts.len(), 1);
        assert_eq!(drifts[0].expected.to_string(), "Maio 2026");

        assert_eq!(doctor.fix_periods().unwrap(), 1);
        assert!(doctor.check_periods().unwrap().is_empty());
        assert_eq!(
            store.get(id).unwrap().unwrap().reference_period.to_string(),
            "Maio 2026"
        );
    }

    #[test]
    fn test_recurring_calendar_rows_are_not_drift() {
        let store = Arc::new(MemoryStore::new());
        let occurred_on = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        store
            .create(&NewTransaction {
                owner: "local".to_string(),
                kind: TransactionKind::Income,
                occurred_on,
                reference_period: ReferencePeriod::from_date(occurred_on),
                category: "AC-4".to_string(),
                description: "Auxílio".to_string(),
                amount: Decimal::new(800, 0),
                status: TransactionStatus::Pending,
                recurring: true,
            })
            .unwrap();

        let doctor = DoctorService::new(store, PeriodResolver::new(PeriodShifts::default()), "local");
        assert!(doctor.check_periods().unwrap().is_empty());
        assert_eq!(doctor.fix_periods().unwrap(), 0);
    }
}
