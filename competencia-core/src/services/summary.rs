//! Summary service - dashboard aggregates per reference period

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{ReferencePeriod, Transaction, TransactionKind, TransactionStatus};

/// Totals for one period (or for everything when `period` is `None`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: Option<ReferencePeriod>,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub balance: Decimal,
    pub pending_expense_total: Decimal,
    pub transaction_count: usize,
    pub expenses_by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    /// Percentage of the period's expense total, two decimals
    pub share: Decimal,
}

/// Observations shown next to a period's totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Insight {
    /// Income versus the previous period, as a percentage
    IncomeChange {
        previous_period: ReferencePeriod,
        change_percent: Decimal,
    },
    TopExpenseCategory { category: String, total: Decimal },
    PendingExpenses { total: Decimal },
    /// Period expenses more than 10% under the monthly average
    ExpensesBelowAverage { average: Decimal, saved: Decimal },
    /// Period expenses more than 10% over the monthly average
    ExpensesAboveAverage { average: Decimal, excess: Decimal },
    /// The busiest expense day of the week is Saturday or Sunday
    WeekendSpending,
    /// Nothing worth pointing out
    Stable,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Distinct periods present in `txs`, newest first
    pub fn available_periods(&self, txs: &[Transaction]) -> Vec<ReferencePeriod> {
        let periods: BTreeSet<ReferencePeriod> = txs.iter().map(|tx| tx.reference_period).collect();
        periods.into_iter().rev().collect()
    }

    pub fn summarize(&self, txs: &[Transaction], period: Option<ReferencePeriod>) -> PeriodSummary {
        let selected: Vec<&Transaction> = txs
            .iter()
            .filter(|tx| period.map_or(true, |p| tx.reference_period == p))
            .collect();

        let income_total = sum(selected.iter().copied().filter(|tx| tx.is_income()));
        let expense_total = sum(selected.iter().copied().filter(|tx| tx.is_expense()));
        let pending_expense_total = sum(
            selected
                .iter()
                .copied()
                .filter(|tx| tx.is_expense() && tx.status == TransactionStatus::Pending),
        );

        PeriodSummary {
            period,
            income_total,
            expense_total,
            balance: income_total - expense_total,
            pending_expense_total,
            transaction_count: selected.len(),
            expenses_by_category: category_totals(&selected, expense_total),
        }
    }

    /// Month-over-month observations for `period`
    pub fn insights(&self, txs: &[Transaction], period: ReferencePeriod) -> Vec<Insight> {
        let current = self.summarize(txs, Some(period));
        let previous_period = period.previous();
        let previous = self.summarize(txs, Some(previous_period));

        let mut insights = Vec::new();

        if previous.income_total > Decimal::ZERO {
            let change_percent = ((current.income_total - previous.income_total)
                / previous.income_total
                * Decimal::ONE_HUNDRED)
                .round_dp(1);
            if !change_percent.is_zero() {
                insights.push(Insight::IncomeChange {
                    previous_period,
                    change_percent,
                });
            }
        }

        if let Some(top) = current.expenses_by_category.first() {
            insights.push(Insight::TopExpenseCategory {
                category: top.category.clone(),
                total: top.total,
            });
        }

        if current.pending_expense_total > Decimal::ZERO {
            insights.push(Insight::PendingExpenses {
                total: current.pending_expense_total,
            });
        }

        if let Some(insight) = average_insight(txs, period) {
            insights.push(insight);
        }

        if spends_most_on_weekends(txs) {
            insights.push(Insight::WeekendSpending);
        }

        if insights.is_empty() {
            insights.push(Insight::Stable);
        }
        insights
    }

    /// Pending expenses dated `today` or earlier, oldest first
    pub fn due_expenses(&self, txs: &[Transaction], today: NaiveDate) -> Vec<Transaction> {
        let mut due: Vec<Transaction> = txs
            .iter()
            .filter(|tx| {
                tx.is_expense() && tx.status == TransactionStatus::Pending && tx.occurred_on <= today
            })
            .cloned()
            .collect();
        due.sort_by_key(|tx| tx.occurred_on);
        due
    }
}

/// Compare the period's expenses with the average over every period that has any
fn average_insight(txs: &[Transaction], period: ReferencePeriod) -> Option<Insight> {
    let mut by_period: BTreeMap<ReferencePeriod, Decimal> = BTreeMap::new();
    for tx in txs.iter().filter(|tx| tx.is_expense()) {
        *by_period.entry(tx.reference_period).or_default() += tx.amount;
    }
    if by_period.is_empty() {
        return None;
    }

    let average = by_period.values().copied().sum::<Decimal>() / Decimal::from(by_period.len());
    let current = by_period.get(&period).copied().unwrap_or_default();

    if current > Decimal::ZERO && current < average * Decimal::new(9, 1) {
        Some(Insight::ExpensesBelowAverage {
            average: average.round_dp(2),
            saved: (average - current).round_dp(2),
        })
    } else if current > average * Decimal::new(11, 1) {
        Some(Insight::ExpensesAboveAverage {
            average: average.round_dp(2),
            excess: (current - average).round_dp(2),
        })
    } else {
        None
    }
}

/// Counts expenses per weekday; ties go to the earlier day, Monday first
fn spends_most_on_weekends(txs: &[Transaction]) -> bool {
    let mut counts = [0usize; 7];
    for tx in txs.iter().filter(|tx| tx.is_expense()) {
        counts[tx.occurred_on.weekday().num_days_from_monday() as usize] += 1;
    }

    let mut busiest = 0;
    for day in 1..counts.len() {
        if counts[day] > counts[busiest] {
            busiest = day;
        }
    }
    counts[busiest] > 0 && busiest >= 5
}

fn sum<'a>(txs: impl Iterator<Item = &'a Transaction>) -> Decimal {
    txs.map(|tx| tx.amount).sum()
}

fn category_totals(txs: &[&Transaction], expense_total: Decimal) -> Vec<CategoryTotal> {
    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    for tx in txs.iter().filter(|tx| tx.kind == TransactionKind::Expense) {
        *by_category.entry(tx.category.as_str()).or_default() += tx.amount;
    }

    let mut totals: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
            share: if expense_total.is_zero() {
                Decimal::ZERO
            } else {
                (total / expense_total * Decimal::ONE_HUNDRED).round_dp(2)
            },
        })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    totals
}
