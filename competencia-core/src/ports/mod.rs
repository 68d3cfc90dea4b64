//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, not on concrete implementations.

mod clock;
mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use repository::TransactionStore;
