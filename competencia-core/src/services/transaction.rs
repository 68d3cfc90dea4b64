//! Transaction service - validated creation, editing and listing

use std::sync::Arc;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    CategoryRegistry, NewTransaction, PeriodResolver, ReferencePeriod, Transaction,
    TransactionKind, TransactionPatch, TransactionStatus,
};
use crate::ports::TransactionStore;

/// User input for a new transaction (the period is always derived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub occurred_on: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub status: TransactionStatus,
    #[serde(default)]
    pub recurring: bool,
}

/// Fields to change on an existing transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionEdit {
    pub kind: Option<TransactionKind>,
    pub occurred_on: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub status: Option<TransactionStatus>,
    pub recurring: Option<bool>,
}

/// Listing filter; `None` fields match everything
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub period: Option<ReferencePeriod>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    /// Case-insensitive substring of the description
    pub search: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.period.is_some_and(|p| tx.reference_period != p) {
            return false;
        }
        if self.kind.is_some_and(|k| tx.kind != k) {
            return false;
        }
        if let Some(category) = &self.category {
            if &tx.category != category {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !tx.description.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
    categories: CategoryRegistry,
    resolver: PeriodResolver,
    owner: String,
}

impl TransactionService {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        categories: CategoryRegistry,
        resolver: PeriodResolver,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            store,
            categories,
            resolver,
            owner: owner.into(),
        }
    }

    pub fn resolver(&self) -> &PeriodResolver {
        &self.resolver
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    /// Validate, resolve the period and store a new transaction
    pub fn create(&self, input: TransactionInput) -> Result<Transaction> {
        let draft = self.draft(input)?;
        self.persist(draft)
    }

    /// Create with the kind's default status, never recurring
    pub fn quick_add(
        &self,
        kind: TransactionKind,
        occurred_on: NaiveDate,
        category: &str,
        description: &str,
        amount: Decimal,
    ) -> Result<Transaction> {
        self.create(TransactionInput {
            kind,
            occurred_on,
            category: category.to_string(),
            description: description.to_string(),
            amount,
            status: kind.default_status(),
            recurring: false,
        })
    }

    /// Split a purchase into `count` monthly transactions labelled `"desc (i/count)"`
    ///
    /// Everything is validated before the first one is stored. If the store
    /// fails part way, the installments already written are deleted again
    /// and the store error is returned.
    pub fn create_installments(&self, input: TransactionInput, count: u32) -> Result<Vec<Transaction>> {
        if count < 2 {
            return Err(Error::validation(format!(
                "installments need a count of at least 2, got {}",
                count
            )));
        }
        if input.recurring {
            return Err(Error::validation("installments cannot be recurring"));
        }

        let mut drafts = Vec::with_capacity(count as usize);
        for i in 0..count {
            let occurred_on = add_months_clamped(input.occurred_on, i)?;
            let status = if i == 0 { input.status } else { TransactionStatus::Pending };
            drafts.push(self.draft(TransactionInput {
                occurred_on,
                description: format!("{} ({}/{})", input.description.trim(), i + 1, count),
                status,
                ..input.clone()
            })?);
        }

        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            match self.persist(draft) {
                Ok(tx) => created.push(tx),
                Err(e) => {
                    self.roll_back(&created);
                    return Err(e);
                }
            }
        }
        Ok(created)
    }

    /// Apply an edit, coercing the status on a kind change and re-resolving the period
    pub fn edit(&self, id: Uuid, edit: TransactionEdit) -> Result<Transaction> {
        let current = self.require(id)?;

        let kind = edit.kind.unwrap_or(current.kind);
        let category = edit.category.clone().unwrap_or_else(|| current.category.clone());
        let occurred_on = edit.occurred_on.unwrap_or(current.occurred_on);
        let status = match edit.status {
            Some(status) if kind == current.kind => status,
            Some(status) => status.coerce_for(kind),
            None => current.status.coerce_for(kind),
        };

        if kind != current.kind || category != current.category {
            self.categories.ensure_allowed(kind, &category)?;
        }

        let mut updated = current.clone();
        let patch = TransactionPatch {
            kind: Some(kind),
            occurred_on: Some(occurred_on),
            reference_period: Some(self.resolver.resolve(occurred_on, &category, kind)),
            category: Some(category),
            description: edit.description.map(|d| d.trim().to_string()),
            amount: edit.amount,
            status: Some(status),
            recurring: edit.recurring,
        };
        updated.apply(&patch);
        updated.validate()?;

        self.store.update(id, &patch)?;
        debug!(id = %id, period = %updated.reference_period, "transaction edited");
        self.require(id)
    }

    /// Copy a transaction under a new id, optionally on another date
    ///
    /// The copy starts over with the kind's default status.
    pub fn duplicate(&self, id: Uuid, occurred_on: Option<NaiveDate>) -> Result<Transaction> {
        let source = self.require(id)?;
        self.create(TransactionInput {
            kind: source.kind,
            occurred_on: occurred_on.unwrap_or(source.occurred_on),
            category: source.category,
            description: source.description,
            amount: source.amount,
            status: source.kind.default_status(),
            recurring: source.recurring,
        })
    }

    /// Flip between `Pending` and the kind's settled status
    pub fn toggle_status(&self, id: Uuid) -> Result<Transaction> {
        let tx = self.require(id)?;
        self.store.update(
            id,
            &TransactionPatch {
                status: Some(tx.status.toggled(tx.kind)),
                ..Default::default()
            },
        )?;
        self.require(id)
    }

    /// Start or stop a recurring chain
    pub fn set_recurring(&self, id: Uuid, recurring: bool) -> Result<Transaction> {
        self.require(id)?;
        self.store.update(
            id,
            &TransactionPatch {
                recurring: Some(recurring),
                ..Default::default()
            },
        )?;
        self.require(id)
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.require(id)?;
        self.store.delete(id)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self.store.get(id)?.filter(|tx| tx.owner == self.owner))
    }

    /// Matching transactions, newest first (ties broken by creation time)
    pub fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut txs: Vec<Transaction> = self
            .store
            .list(&self.owner)?
            .into_iter()
            .filter(|tx| filter.matches(tx))
            .collect();
        txs.sort_by(|a, b| {
            b.occurred_on
                .cmp(&a.occurred_on)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(txs)
    }

    fn roll_back(&self, created: &[Transaction]) {
        for tx in created {
            if let Err(e) = self.store.delete(tx.id) {
                warn!(id = %tx.id, error = %e, "could not remove partial installment");
            }
        }
    }

    fn require(&self, id: Uuid) -> Result<Transaction> {
        self.get(id)?
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))
    }

    fn draft(&self, input: TransactionInput) -> Result<NewTransaction> {
        self.categories.ensure_allowed(input.kind, &input.category)?;
        let draft = NewTransaction {
            owner: self.owner.clone(),
            kind: input.kind,
            occurred_on: input.occurred_on,
            reference_period: self
                .resolver
                .resolve(input.occurred_on, &input.category, input.kind),
            category: input.category,
            description: input.description.trim().to_string(),
            amount: input.amount,
            status: input.status,
            recurring: input.recurring,
        };
        draft.validate()?;
        Ok(draft)
    }

    fn persist(&self, draft: NewTransaction) -> Result<Transaction> {
        let id = self.store.create(&draft)?;
        debug!(id = %id, period = %draft.reference_period, "transaction created");
        self.require(id)
    }
}

/// `date + months`, clamping the day to the target month's last day
fn add_months_clamped(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| Error::validation(format!("date {} plus {} months is out of range", date, months)))
}
