//! CLI command implementations

pub mod add;
pub mod category;
pub mod delete;
pub mod doctor;
pub mod due;
pub mod duplicate;
pub mod edit;
pub mod export;
pub mod installments;
pub mod list;
pub mod logs;
pub mod recur;
pub mod recurring;
pub mod summary;
pub mod toggle;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use competencia_core::domain::parse_stored_date;
use competencia_core::ports::{Clock, FixedClock, SystemClock};
use competencia_core::services::{RecurrenceReport, TransactionFilter};
use competencia_core::{
    CompetenciaContext, LogEvent, LoggingService, ReferencePeriod, TransactionKind,
    TransactionStatus,
};

use crate::output;

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Pretend today is this date
    pub today: Option<NaiveDate>,
    pub json: bool,
    /// Skip the recurrence pass before the command
    pub no_recur: bool,
}

impl GlobalOpts {
    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.today {
            Some(date) => Arc::new(FixedClock(date)),
            None => Arc::new(SystemClock),
        }
    }
}

/// Get the data directory from `COMPETENCIA_DIR` or `~/.competencia`
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("COMPETENCIA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".competencia"))
        .ok_or_else(|| anyhow!("Could not find home directory; set COMPETENCIA_DIR"))
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (it never blocks a command)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Open the context without running the recurrence pass
pub fn open_context(opts: &GlobalOpts) -> Result<CompetenciaContext> {
    let data_dir = get_data_dir()?;
    debug!("Opening data directory {}", data_dir.display());
    CompetenciaContext::new(&data_dir, opts.clock())
        .with_context(|| format!("Failed to open data directory: {}", data_dir.display()))
}

/// Open the context and bring the current period up to date
pub fn get_context(opts: &GlobalOpts) -> Result<CompetenciaContext> {
    let ctx = open_context(opts)?;
    if !opts.no_recur {
        match ctx.session.bootstrap() {
            Ok(Some(report)) => announce_recurrence(&report, opts.json),
            Ok(None) => {}
            // Commands still work on the data that is there
            Err(e) => {
                if !opts.json {
                    output::warning(&format!("Recurring transactions were not checked: {}", e));
                }
                log_event(&get_logger(), LogEvent::new("recurrence_failed").with_error(e.to_string()));
            }
        }
    }
    Ok(ctx)
}

/// Tell the user what the recurrence pass did and record it in the event log
pub fn announce_recurrence(report: &RecurrenceReport, json: bool) {
    let logger = get_logger();
    if !report.created.is_empty() {
        log_event(
            &logger,
            LogEvent::new("recurrence_materialized")
                .with_period(report.current_period)
                .with_count(report.created.len()),
        );
    }
    for failure in &report.failed {
        log_event(
            &logger,
            LogEvent::new("recurrence_failed")
                .with_period(report.current_period)
                .with_error(failure.error.clone()),
        );
    }

    if json || report.is_noop() {
        return;
    }
    if !report.created.is_empty() {
        output::info(&format!(
            "{} recurring transaction(s) added to {}",
            report.created.len(),
            report.current_period
        ));
    }
    for failure in &report.failed {
        eprintln!(
            "{} could not copy '{}' into {}: {}",
            "!".red(),
            failure.signature.description,
            report.current_period,
            failure.error
        );
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    parse_stored_date(s).map_err(|_| anyhow!("Invalid date '{}'. Use YYYY-MM-DD or DD/MM/YYYY", s))
}

/// Accepts `120.50`, `120,50` and `1.234,56`
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let s = s.trim().trim_start_matches("R$").trim();
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    Decimal::from_str(&normalized).map_err(|_| anyhow!("Invalid amount '{}'", s))
}

pub fn parse_kind(s: &str) -> Result<TransactionKind> {
    Ok(TransactionKind::from_str(s)?)
}

pub fn parse_status(s: &str) -> Result<TransactionStatus> {
    Ok(TransactionStatus::from_str(s)?)
}

pub fn parse_period(s: &str) -> Result<ReferencePeriod> {
    ReferencePeriod::from_str(s).map_err(|_| anyhow!("Invalid period '{}'. Use e.g. \"Janeiro 2026\"", s))
}

/// Resolve a full id or a unique id prefix
pub fn resolve_id(ctx: &CompetenciaContext, raw: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }

    let prefix = raw.trim().to_lowercase();
    if prefix.len() < 4 {
        bail!("Transaction id '{}' is too short (use at least 4 characters)", raw);
    }
    let matches: Vec<Uuid> = ctx
        .transaction_service
        .list(&TransactionFilter::default())?
        .into_iter()
        .map(|tx| tx.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No transaction matches '{}'", raw),
        _ => bail!("'{}' matches {} transactions; use a longer prefix", raw, matches.len()),
    }
}
