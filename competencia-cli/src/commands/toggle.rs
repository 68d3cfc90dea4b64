//! Toggle command - flip a transaction between pending and settled

use anyhow::Result;

use competencia_core::{LogEvent, OperationResult};

use super::{get_context, get_logger, log_event, resolve_id, GlobalOpts};
use crate::output;

pub fn run(opts: &GlobalOpts, id: &str) -> Result<()> {
    let ctx = get_context(opts)?;
    let id = resolve_id(&ctx, id)?;
    let tx = ctx.transaction_service.toggle_status(id)?;

    log_event(&get_logger(), LogEvent::new("status_toggled").with_command("toggle"));

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&tx))?);
        return Ok(());
    }

    output::success(&format!(
        "{} is now {}",
        output::short_id(&tx.id),
        output::status_label(tx.status)
    ));
    Ok(())
}
