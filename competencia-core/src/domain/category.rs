//! Category allow-list per transaction kind

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::transaction::TransactionKind;

pub const DEFAULT_INCOME_CATEGORIES: [&str; 4] = ["Salário", "AC-4", "Renda Extra", "Outros"];

pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 8] = [
    "Aluguel",
    "Energia",
    "Consórcio",
    "IPASGO",
    "Saneago",
    "Internet",
    "Cartão",
    "Outros",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    #[serde(default)]
    pub income: Vec<String>,
    #[serde(default)]
    pub expense: Vec<String>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            income: DEFAULT_INCOME_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            expense: DEFAULT_EXPENSE_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CategoryRegistry {
    pub fn categories(&self, kind: TransactionKind) -> &[String] {
        match kind {
            TransactionKind::Income => &self.income,
            TransactionKind::Expense => &self.expense,
        }
    }

    pub fn is_allowed(&self, kind: TransactionKind, name: &str) -> bool {
        self.categories(kind).iter().any(|c| c == name)
    }

    /// Error unless `name` is allowed for `kind`
    pub fn ensure_allowed(&self, kind: TransactionKind, name: &str) -> Result<()> {
        if self.is_allowed(kind, name) {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "category '{}' is not allowed for {}",
                name, kind
            )))
        }
    }

    pub fn add(&mut self, kind: TransactionKind, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("category name must not be empty"));
        }
        if self.is_allowed(kind, name) {
            return Err(Error::validation(format!(
                "category '{}' already exists for {}",
                name, kind
            )));
        }
        self.list_mut(kind).push(name.to_string());
        Ok(())
    }

    pub fn remove(&mut self, kind: TransactionKind, name: &str) -> Result<()> {
        let list = self.list_mut(kind);
        let idx = list
            .iter()
            .position(|c| c == name.trim())
            .ok_or_else(|| Error::not_found(format!("category '{}' for {}", name, kind)))?;
        list.remove(idx);
        Ok(())
    }

    fn list_mut(&mut self, kind: TransactionKind) -> &mut Vec<String> {
        match kind {
            TransactionKind::Income => &mut self.income,
            TransactionKind::Expense => &mut self.expense,
        }
    }
}
