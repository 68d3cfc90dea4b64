//! Business logic services
//!
//! Services orchestrate domain logic over the ports.

mod doctor;
mod export;
mod logging;
mod migration;
mod recurrence;
mod session;
mod summary;
mod transaction;

pub use doctor::{DoctorService, PeriodDrift};
pub use export::ExportService;
pub use logging::{now_ms, LogEntry, LogEvent, LoggingService, LOG_DB_FILE};
pub use migration::{MigrationResult, MigrationService};
pub use recurrence::{RecurrenceFailure, RecurrenceReport, RecurrenceService, SkippedRecurrence};
pub use session::Session;
pub use summary::{CategoryTotal, Insight, PeriodSummary, SummaryService};
pub use transaction::{TransactionEdit, TransactionFilter, TransactionInput, TransactionService};
