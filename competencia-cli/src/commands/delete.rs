//! Delete command - remove a transaction

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use competencia_core::domain::format_display_date;
use competencia_core::{LogEvent, OperationResult};

use super::{get_context, get_logger, log_event, resolve_id, GlobalOpts};
use crate::output;

pub fn run(opts: &GlobalOpts, id: &str, force: bool) -> Result<()> {
    let ctx = get_context(opts)?;
    let id = resolve_id(&ctx, id)?;

    if !force && !opts.json {
        if let Some(tx) = ctx.transaction_service.get(id)? {
            println!(
                "\n{}",
                format!(
                    "This will delete '{}' ({}, {}).",
                    tx.description,
                    format_display_date(tx.occurred_on),
                    output::format_currency(tx.amount)
                )
                .yellow()
            );
            if tx.recurring {
                println!("{}", "It is recurring: next month's copy will not be created.".dimmed());
            }
        }

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.transaction_service.delete(id)?;
    log_event(&get_logger(), LogEvent::new("transaction_deleted").with_command("delete"));

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(id))?);
        return Ok(());
    }
    output::success(&format!("Deleted {}", output::short_id(&id)));
    Ok(())
}
