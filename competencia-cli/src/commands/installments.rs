//! Installments command - split a purchase across months

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;

use competencia_core::domain::format_display_date;
use competencia_core::services::TransactionInput;
use competencia_core::{LogEvent, OperationResult, TransactionKind, TransactionStatus};

use super::{get_context, get_logger, log_event, parse_amount, parse_date, parse_kind, parse_status, GlobalOpts};
use crate::output;

#[derive(Args, Debug)]
pub struct InstallmentsArgs {
    /// Amount of each installment
    #[arg(value_parser = parse_amount)]
    pub amount: Decimal,
    /// Number of installments (at least 2)
    pub count: u32,
    pub category: String,
    pub description: String,
    #[arg(long, short, default_value = "expense", value_parser = parse_kind)]
    pub kind: TransactionKind,
    /// Date of the first installment, defaults to today
    #[arg(long, short, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    /// Status of the first installment; the rest start Pending
    #[arg(long, short, value_parser = parse_status)]
    pub status: Option<TransactionStatus>,
}

pub fn run(opts: &GlobalOpts, args: InstallmentsArgs) -> Result<()> {
    let ctx = get_context(opts)?;
    let occurred_on = args.date.unwrap_or_else(|| ctx.clock.today());

    let txs = ctx.transaction_service.create_installments(
        TransactionInput {
            kind: args.kind,
            occurred_on,
            category: args.category,
            description: args.description,
            amount: args.amount,
            status: args.status.unwrap_or_else(|| args.kind.default_status()),
            recurring: false,
        },
        args.count,
    )?;

    log_event(
        &get_logger(),
        LogEvent::new("installments_created")
            .with_command("installments")
            .with_count(txs.len()),
    );

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&txs))?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Date", "Description", "Period", "Amount", "Status"]);
    for tx in &txs {
        table.add_row(vec![
            output::short_id(&tx.id),
            format_display_date(tx.occurred_on),
            tx.description.clone(),
            tx.reference_period.to_string(),
            output::format_currency(tx.amount),
            tx.status.to_string(),
        ]);
    }
    println!("{}", table);
    output::success(&format!("{} installments created", txs.len()));
    Ok(())
}
