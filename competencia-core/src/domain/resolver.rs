//! Reference-month resolution
//!
//! Some income is paid in one month but budgeted in a later one (AC-4
//! allowances arrive two months early). The resolver maps a transaction's
//! `(date, category, kind)` to the period it counts toward.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::period::ReferencePeriod;
use super::transaction::TransactionKind;

/// Month shifts keyed by kind then category; a missing entry means no shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodShifts {
    #[serde(default)]
    pub income: BTreeMap<String, i32>,
    #[serde(default)]
    pub expense: BTreeMap<String, i32>,
}

impl Default for PeriodShifts {
    fn default() -> Self {
        let mut income = BTreeMap::new();
        income.insert("AC-4".to_string(), 2);
        Self {
            income,
            expense: BTreeMap::new(),
        }
    }
}

impl PeriodShifts {
    /// A table with no shifts at all
    pub fn none() -> Self {
        Self {
            income: BTreeMap::new(),
            expense: BTreeMap::new(),
        }
    }

    pub fn for_kind(&self, kind: TransactionKind) -> &BTreeMap<String, i32> {
        match kind {
            TransactionKind::Income => &self.income,
            TransactionKind::Expense => &self.expense,
        }
    }

    pub fn get(&self, kind: TransactionKind, category: &str) -> i32 {
        self.for_kind(kind).get(category).copied().unwrap_or(0)
    }

    /// Set the shift for a category; zero removes the entry
    pub fn set(&mut self, kind: TransactionKind, category: &str, months: i32) {
        let table = match kind {
            TransactionKind::Income => &mut self.income,
            TransactionKind::Expense => &mut self.expense,
        };
        if months == 0 {
            table.remove(category);
        } else {
            table.insert(category.to_string(), months);
        }
    }
}

/// Pure `(date, category, kind) -> period` mapping
#[derive(Debug, Clone, Default)]
pub struct PeriodResolver {
    shifts: PeriodShifts,
}

impl PeriodResolver {
    pub fn new(shifts: PeriodShifts) -> Self {
        Self { shifts }
    }

    pub fn shifts(&self) -> &PeriodShifts {
        &self.shifts
    }

    /// Resolve the reference period; unknown categories fall back to the calendar month
    pub fn resolve(&self, date: NaiveDate, category: &str, kind: TransactionKind) -> ReferencePeriod {
        ReferencePeriod::from_date(date).shift(self.shifts.get(kind, category))
    }
}
