//! Add command - record a single transaction

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;

use competencia_core::services::TransactionInput;
use competencia_core::{LogEvent, OperationResult, TransactionKind, TransactionStatus};

use super::{get_context, get_logger, log_event, parse_amount, parse_date, parse_kind, parse_status, GlobalOpts};
use crate::output;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// income or expense (receita/despesa also work)
    #[arg(value_parser = parse_kind)]
    pub kind: TransactionKind,
    /// Amount, e.g. 120.50 or 120,50
    #[arg(value_parser = parse_amount)]
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    /// Date (YYYY-MM-DD or DD/MM/YYYY), defaults to today
    #[arg(long, short, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    /// Status; defaults to Received for income and Pending for expenses
    #[arg(long, short, value_parser = parse_status)]
    pub status: Option<TransactionStatus>,
    /// Copy this transaction into every following month
    #[arg(long)]
    pub recurring: bool,
}

pub fn run(opts: &GlobalOpts, args: AddArgs) -> Result<()> {
    let ctx = get_context(opts)?;
    let occurred_on = args.date.unwrap_or_else(|| ctx.clock.today());

    let tx = ctx.transaction_service.create(TransactionInput {
        kind: args.kind,
        occurred_on,
        category: args.category,
        description: args.description,
        amount: args.amount,
        status: args.status.unwrap_or_else(|| args.kind.default_status()),
        recurring: args.recurring,
    })?;

    log_event(
        &get_logger(),
        LogEvent::new("transaction_created")
            .with_command("add")
            .with_period(tx.reference_period),
    );

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&tx))?);
        return Ok(());
    }

    output::success(&format!(
        "{} {} in {} ({})",
        tx.kind,
        output::format_currency(tx.amount),
        tx.reference_period,
        output::short_id(&tx.id)
    ));
    if tx.reference_period != competencia_core::ReferencePeriod::from_date(tx.occurred_on) {
        output::info(&format!(
            "Dated {} but counted toward {}",
            competencia_core::domain::format_display_date(tx.occurred_on),
            tx.reference_period
        ));
    }
    Ok(())
}
