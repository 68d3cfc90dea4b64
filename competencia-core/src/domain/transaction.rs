//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::period::ReferencePeriod;
use super::result::{Error, Result};

/// Whether money comes in or goes out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }

    /// Status used by quick entry when the user does not pick one
    pub fn default_status(&self) -> TransactionStatus {
        match self {
            TransactionKind::Income => TransactionStatus::Received,
            TransactionKind::Expense => TransactionStatus::Pending,
        }
    }

    /// The status meaning "settled" for this kind
    pub fn done_status(&self) -> TransactionStatus {
        match self {
            TransactionKind::Income => TransactionStatus::Received,
            TransactionKind::Expense => TransactionStatus::Paid,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    /// Accepts the English names and the `Receita`/`Despesa` labels of older exports
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(TransactionKind::Income),
            "expense" | "despesa" => Ok(TransactionKind::Expense),
            other => Err(Error::validation(format!("unknown transaction type '{}'", other))),
        }
    }
}

/// Settlement state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Income that has arrived
    Received,
    Pending,
    /// Expense that has been settled
    Paid,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Received => "Received",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Paid => "Paid",
        }
    }

    pub fn is_allowed_for(&self, kind: TransactionKind) -> bool {
        matches!(
            (kind, self),
            (_, TransactionStatus::Pending)
                | (TransactionKind::Income, TransactionStatus::Received)
                | (TransactionKind::Expense, TransactionStatus::Paid)
        )
    }

    /// Carry this status over to `kind`: a settled status stays settled
    pub fn coerce_for(&self, kind: TransactionKind) -> TransactionStatus {
        match self {
            TransactionStatus::Pending => TransactionStatus::Pending,
            TransactionStatus::Received | TransactionStatus::Paid => kind.done_status(),
        }
    }

    /// `Pending` flips to the settled status of `kind`, anything else back to `Pending`
    pub fn toggled(&self, kind: TransactionKind) -> TransactionStatus {
        match self {
            TransactionStatus::Pending => kind.done_status(),
            _ => TransactionStatus::Pending,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "received" | "recebido" => Ok(TransactionStatus::Received),
            "pending" | "pendente" => Ok(TransactionStatus::Pending),
            "paid" | "pago" => Ok(TransactionStatus::Paid),
            other => Err(Error::validation(format!("unknown status '{}'", other))),
        }
    }
}

/// A transaction that has not been stored yet
///
/// The store assigns the id when it persists a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub owner: String,
    pub kind: TransactionKind,
    pub occurred_on: NaiveDate,
    pub reference_period: ReferencePeriod,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub recurring: bool,
}

impl NewTransaction {
    /// Field-level checks that do not need the category registry
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.description, self.amount, self.kind, self.status)
    }

    /// Signature used to detect an already materialized recurrence
    pub fn signature(&self) -> Signature {
        Signature::new(&self.description, &self.category)
    }
}

/// A single income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub owner: String,
    pub kind: TransactionKind,
    pub occurred_on: NaiveDate,
    /// Budget month this transaction counts toward, derived from
    /// `(occurred_on, category, kind)`
    pub reference_period: ReferencePeriod,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub status: TransactionStatus,
    /// Template that replays itself into every new period
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Build a stored transaction from a draft and the id the store assigned
    pub fn from_new(id: Uuid, draft: NewTransaction) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner: draft.owner,
            kind: draft.kind,
            occurred_on: draft.occurred_on,
            reference_period: draft.reference_period,
            category: draft.category,
            description: draft.description,
            amount: draft.amount,
            status: draft.status,
            recurring: draft.recurring,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy the user-editable fields into a new draft
    pub fn to_new(&self) -> NewTransaction {
        NewTransaction {
            owner: self.owner.clone(),
            kind: self.kind,
            occurred_on: self.occurred_on,
            reference_period: self.reference_period,
            category: self.category.clone(),
            description: self.description.clone(),
            amount: self.amount,
            status: self.status,
            recurring: self.recurring,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.description, self.amount, self.kind, self.status)
    }

    pub fn signature(&self) -> Signature {
        Signature::new(&self.description, &self.category)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Apply a patch in place (bookkeeping timestamps are left to the store)
    pub fn apply(&mut self, patch: &TransactionPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(date) = patch.occurred_on {
            self.occurred_on = date;
        }
        if let Some(period) = patch.reference_period {
            self.reference_period = period;
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(recurring) = patch.recurring {
            self.recurring = recurring;
        }
    }
}

/// Partial update sent to the store; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub occurred_on: Option<NaiveDate>,
    pub reference_period: Option<ReferencePeriod>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub status: Option<TransactionStatus>,
    pub recurring: Option<bool>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self == &TransactionPatch::default()
    }
}

/// `(description, category)` pair identifying one occurrence of a recurring
/// transaction within a period
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Signature {
    pub description: String,
    pub category: String,
}

impl Signature {
    pub fn new(description: &str, category: &str) -> Self {
        Self {
            description: description.to_string(),
            category: category.to_string(),
        }
    }
}

/// Decimal places an amount may carry
pub const AMOUNT_SCALE: u32 = 2;

fn validate_fields(
    description: &str,
    amount: Decimal,
    kind: TransactionKind,
    status: TransactionStatus,
) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation(format!("amount must be greater than zero, got {}", amount)));
    }
    // Stored as DECIMAL(18, 2); anything finer would be rounded away
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::validation(format!(
            "amount must have at most {} decimal places, got {}",
            AMOUNT_SCALE, amount
        )));
    }
    if description.trim().is_empty() {
        return Err(Error::validation("description must not be empty"));
    }
    if !status.is_allowed_for(kind) {
        return Err(Error::validation(format!(
            "status {} is not valid for {}",
            status, kind
        )));
    }
    Ok(())
}
