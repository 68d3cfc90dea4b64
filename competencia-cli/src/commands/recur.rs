//! Recur command - run the recurrence pass on demand

use anyhow::Result;
use colored::Colorize;

use competencia_core::OperationResult;

use super::{announce_recurrence, open_context, GlobalOpts};
use crate::output;

pub fn run(opts: &GlobalOpts) -> Result<()> {
    let ctx = open_context(opts)?;
    let report = ctx.recurrence_service.run()?;
    announce_recurrence(&report, true);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&report))?);
        return Ok(());
    }

    println!(
        "{} {} → {}",
        "Recurrence".bold(),
        report.previous_period,
        report.current_period
    );
    if report.is_noop() && report.skipped.is_empty() {
        println!("{}", "Nothing recurring in the previous period.".dimmed());
        return Ok(());
    }

    for created in &report.created {
        output::success(&format!("Created '{}' ({})", created.description, created.category));
    }
    for skipped in &report.skipped {
        println!(
            "{} '{}' already exists in {}",
            "-".dimmed(),
            skipped.signature.description,
            report.current_period
        );
    }
    for failure in &report.failed {
        output::error(&format!("Failed '{}': {}", failure.signature.description, failure.error));
    }
    Ok(())
}
