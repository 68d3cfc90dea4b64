//! Competência Core - reference-month personal finance engine
//!
//! Transactions are budgeted against a reference period (competência) that may
//! differ from their calendar month, and recurring transactions replay
//! themselves into each new period exactly once.
//!
//! - **domain**: periods, transactions, categories, the period resolver
//! - **ports**: the transaction store and clock traits
//! - **services**: transactions, recurrence, summaries, export, doctor, logging
//! - **adapters**: DuckDB and in-memory stores

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::DuckDbStore;
use config::Config;
use ports::{Clock, TransactionStore};
use services::*;

pub use domain::result::{Error, OperationResult, Result};
pub use domain::{
    CategoryRegistry, NewTransaction, PeriodResolver, PeriodShifts, ReferencePeriod, Transaction,
    TransactionKind, TransactionPatch, TransactionStatus,
};
pub use services::{LogEvent, LoggingService};

pub const DB_FILE: &str = "competencia.duckdb";

/// Main context: configuration, store and every service wired together
pub struct CompetenciaContext {
    pub config: Config,
    pub data_dir: Option<PathBuf>,
    pub store: Arc<dyn TransactionStore>,
    pub clock: Arc<dyn Clock>,
    pub transaction_service: TransactionService,
    pub recurrence_service: Arc<RecurrenceService>,
    pub summary_service: SummaryService,
    pub export_service: ExportService,
    pub doctor_service: DoctorService,
    pub session: Session,
}

impl CompetenciaContext {
    /// Open the DuckDB store and settings in `data_dir`
    pub fn new(data_dir: &Path, clock: Arc<dyn Clock>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let config = Config::load(data_dir)?;
        let store = Arc::new(DuckDbStore::open(&data_dir.join(DB_FILE))?);

        let mut context = Self::with_store(config, store, clock);
        context.data_dir = Some(data_dir.to_path_buf());
        Ok(context)
    }

    /// Wire services over an already-open store
    pub fn with_store(config: Config, store: Arc<dyn TransactionStore>, clock: Arc<dyn Clock>) -> Self {
        let resolver = PeriodResolver::new(config.period_shifts.clone());
        let owner = config.owner.clone();

        let transaction_service = TransactionService::new(
            Arc::clone(&store),
            config.categories.clone(),
            resolver.clone(),
            owner.clone(),
        );
        let recurrence_service = Arc::new(RecurrenceService::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            owner.clone(),
        ));
        let doctor_service = DoctorService::new(Arc::clone(&store), resolver, owner);
        let session = Session::new(Arc::clone(&recurrence_service));

        Self {
            config,
            data_dir: None,
            store,
            clock,
            transaction_service,
            recurrence_service,
            summary_service: SummaryService::new(),
            export_service: ExportService::new(),
            doctor_service,
            session,
        }
    }

    /// Persist the current configuration (no-op for contexts without a data directory)
    pub fn save_config(&self) -> Result<()> {
        match &self.data_dir {
            Some(dir) => self.config.save(dir),
            None => Ok(()),
        }
    }
}
