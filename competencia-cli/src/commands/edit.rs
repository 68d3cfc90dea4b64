//! Edit command - change fields of a transaction

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;

use competencia_core::services::TransactionEdit;
use competencia_core::{LogEvent, OperationResult, TransactionKind, TransactionStatus};

use super::{
    get_context, get_logger, log_event, parse_amount, parse_date, parse_kind, parse_status,
    resolve_id, GlobalOpts,
};
use crate::output;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Transaction id or unique prefix
    pub id: String,
    #[arg(long, short, value_parser = parse_kind)]
    pub kind: Option<TransactionKind>,
    #[arg(long, short, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    #[arg(long, short)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, short, value_parser = parse_amount)]
    pub amount: Option<Decimal>,
    #[arg(long, short, value_parser = parse_status)]
    pub status: Option<TransactionStatus>,
    /// true or false
    #[arg(long)]
    pub recurring: Option<bool>,
}

pub fn run(opts: &GlobalOpts, args: EditArgs) -> Result<()> {
    let ctx = get_context(opts)?;
    let id = resolve_id(&ctx, &args.id)?;

    let edit = TransactionEdit {
        kind: args.kind,
        occurred_on: args.date,
        category: args.category,
        description: args.description,
        amount: args.amount,
        status: args.status,
        recurring: args.recurring,
    };
    if edit == TransactionEdit::default() {
        bail!("Nothing to change. Pass at least one of --kind, --date, --category, --description, --amount, --status, --recurring");
    }

    let before = ctx.transaction_service.get(id)?;
    let tx = ctx.transaction_service.edit(id, edit)?;

    log_event(
        &get_logger(),
        LogEvent::new("transaction_edited")
            .with_command("edit")
            .with_period(tx.reference_period),
    );

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&tx))?);
        return Ok(());
    }

    output::success(&format!("Updated {}", output::short_id(&tx.id)));
    if let Some(before) = before {
        if before.reference_period != tx.reference_period {
            output::info(&format!(
                "Reference period moved from {} to {}",
                before.reference_period, tx.reference_period
            ));
        }
        if before.status != tx.status && args.status.is_none() {
            output::info(&format!("Status changed to {}", tx.status));
        }
    }
    Ok(())
}
