//! Competência CLI - reference-month personal finance in your terminal

use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    add, category, delete, doctor, due, duplicate, edit, export, installments, list, logs, recur,
    recurring, summary, toggle, GlobalOpts,
};
use competencia_core::LogEvent;

/// Environment variable holding the tracing filter, e.g. `COMPETENCIA_LOG=debug`
const LOG_ENV: &str = "COMPETENCIA_LOG";

/// Competência - budget by reference month
#[derive(Parser)]
#[command(name = "cpt", version, about, long_about = None)]
struct Cli {
    /// Pretend today is this date (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long, global = true, value_parser = commands::parse_date)]
    today: Option<NaiveDate>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Do not copy recurring transactions into the current period first
    #[arg(long, global = true)]
    no_recur: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an income or expense
    Add(add::AddArgs),

    /// Split a purchase into monthly installments
    Installments(installments::InstallmentsArgs),

    /// List transactions
    List(list::FilterArgs),

    /// Change fields of a transaction
    Edit(edit::EditArgs),

    /// Copy a transaction
    Duplicate(duplicate::DuplicateArgs),

    /// Flip a transaction between pending and paid/received
    Toggle {
        /// Transaction id or unique prefix
        id: String,
    },

    /// Start or stop a recurring chain
    Recurring(recurring::RecurringArgs),

    /// Delete a transaction
    Delete {
        /// Transaction id or unique prefix
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Totals, category breakdown and insights for a period
    Summary(summary::SummaryArgs),

    /// Export transactions to CSV
    Export(export::ExportArgs),

    /// Pending expenses dated today or earlier
    Due,

    /// Copy last period's recurring transactions into the current one
    Recur,

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: category::CategoryCommands,
    },

    /// Check stored reference periods against the shift table
    Doctor {
        /// Rewrite out-of-date periods
        #[arg(long)]
        fix: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Add(_) => "add",
            Commands::Installments(_) => "installments",
            Commands::List(_) => "list",
            Commands::Edit(_) => "edit",
            Commands::Duplicate(_) => "duplicate",
            Commands::Toggle { .. } => "toggle",
            Commands::Recurring(_) => "recurring",
            Commands::Delete { .. } => "delete",
            Commands::Summary(_) => "summary",
            Commands::Export(_) => "export",
            Commands::Due => "due",
            Commands::Recur => "recur",
            Commands::Category { .. } => "category",
            Commands::Doctor { .. } => "doctor",
            Commands::Logs { .. } => "logs",
        }
    }
}

/// Diagnostics go to stderr so `--json` output stays clean
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let name = cli.command.name();

    match run(cli) {
        Ok(()) => {
            if name != "logs" {
                if let Some(logger) = commands::get_logger() {
                    let _ = logger.log_command(name);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            commands::log_event(
                &commands::get_logger(),
                LogEvent::new("command_failed")
                    .with_command(name)
                    .with_error(e.to_string()),
            );
            output::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOpts {
        today: cli.today,
        json: cli.json,
        no_recur: cli.no_recur,
    };

    match cli.command {
        Commands::Add(args) => add::run(&opts, args),
        Commands::Installments(args) => installments::run(&opts, args),
        Commands::List(args) => list::run(&opts, args),
        Commands::Edit(args) => edit::run(&opts, args),
        Commands::Duplicate(args) => duplicate::run(&opts, args),
        Commands::Toggle { id } => toggle::run(&opts, &id),
        Commands::Recurring(args) => recurring::run(&opts, args),
        Commands::Delete { id, force } => delete::run(&opts, &id, force),
        Commands::Summary(args) => summary::run(&opts, args),
        Commands::Export(args) => export::run(&opts, args),
        Commands::Due => due::run(&opts),
        Commands::Recur => recur::run(&opts),
        Commands::Category { command } => category::run(&opts, command),
        Commands::Doctor { fix } => doctor::run(&opts, fix),
        Commands::Logs { command } => logs::run(opts.json, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cpt", "list", "--today", "2026-02-03", "--json"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2026, 2, 3));
        assert_eq!(cli.command.name(), "list");
    }

    #[test]
    fn test_add_parses_brazilian_amount() {
        let cli = Cli::try_parse_from([
            "cpt", "add", "despesa", "1.234,56", "Mercado", "Compras do mês",
        ])
        .unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.amount, rust_decimal::Decimal::new(123456, 2));
                assert_eq!(args.kind, competencia_core::TransactionKind::Expense);
            }
            _ => panic!("expected add"),
        }
    }
}
