//! Recurring command - start or stop a recurring chain

use anyhow::Result;
use clap::Args;

use competencia_core::{LogEvent, OperationResult};

use super::{get_context, get_logger, log_event, resolve_id, GlobalOpts};
use crate::output;

#[derive(Args, Debug)]
pub struct RecurringArgs {
    /// Transaction id or unique prefix
    pub id: String,
    /// Stop the chain instead of starting it
    #[arg(long)]
    pub off: bool,
}

pub fn run(opts: &GlobalOpts, args: RecurringArgs) -> Result<()> {
    let ctx = get_context(opts)?;
    let id = resolve_id(&ctx, &args.id)?;
    let tx = ctx.transaction_service.set_recurring(id, !args.off)?;

    log_event(&get_logger(), LogEvent::new("recurring_changed").with_command("recurring"));

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&tx))?);
        return Ok(());
    }

    if tx.recurring {
        output::success(&format!(
            "{} will be copied into {} and every month after",
            output::short_id(&tx.id),
            tx.reference_period.next()
        ));
    } else {
        output::success(&format!("{} no longer recurs", output::short_id(&tx.id)));
    }
    Ok(())
}
