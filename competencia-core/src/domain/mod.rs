//! Core domain entities
//!
//! Pure data structures with validation logic, no I/O.

mod category;
pub mod date;
pub mod period;
mod resolver;
pub mod result;
mod transaction;

pub use category::{CategoryRegistry, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES};
pub use date::{format_display_date, parse_stored_date};
pub use period::ReferencePeriod;
pub use resolver::{PeriodResolver, PeriodShifts};
pub use transaction::{
    NewTransaction, Signature, Transaction, TransactionKind, TransactionPatch, TransactionStatus,
};
