//! Duplicate command - copy a transaction

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use competencia_core::{LogEvent, OperationResult};

use super::{get_context, get_logger, log_event, parse_date, resolve_id, GlobalOpts};
use crate::output;

#[derive(Args, Debug)]
pub struct DuplicateArgs {
    /// Transaction id or unique prefix
    pub id: String,
    /// Date for the copy, defaults to the original's date
    #[arg(long, short, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

pub fn run(opts: &GlobalOpts, args: DuplicateArgs) -> Result<()> {
    let ctx = get_context(opts)?;
    let id = resolve_id(&ctx, &args.id)?;
    let copy = ctx.transaction_service.duplicate(id, args.date)?;

    log_event(
        &get_logger(),
        LogEvent::new("transaction_duplicated")
            .with_command("duplicate")
            .with_period(copy.reference_period),
    );

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&copy))?);
        return Ok(());
    }

    output::success(&format!(
        "Copied to {} in {} ({})",
        output::short_id(&copy.id),
        copy.reference_period,
        copy.status
    ));
    Ok(())
}
