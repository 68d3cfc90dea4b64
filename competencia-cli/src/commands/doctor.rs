//! Doctor command - find and fix stale reference periods

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Color};

use competencia_core::domain::format_display_date;
use competencia_core::{LogEvent, OperationResult};

use super::{get_logger, log_event, open_context, GlobalOpts};
use crate::output;

pub fn run(opts: &GlobalOpts, fix: bool) -> Result<()> {
    let ctx = open_context(opts)?;
    let drifts = ctx.doctor_service.check_periods()?;

    let fixed = if fix && !drifts.is_empty() {
        let fixed = ctx.doctor_service.fix_periods()?;
        log_event(
            &get_logger(),
            LogEvent::new("periods_fixed").with_command("doctor").with_count(fixed),
        );
        Some(fixed)
    } else {
        None
    };

    if opts.json {
        let data = serde_json::json!({"drifts": drifts, "fixed": fixed.unwrap_or(0)});
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
        return Ok(());
    }

    println!("{}\n", "Reference Period Check".bold());
    if drifts.is_empty() {
        output::success("All reference periods match the current shift table");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Id", "Kind", "Date", "Stored", "Expected"]);
    for drift in &drifts {
        table.add_row(vec![
            Cell::new(output::short_id(&drift.id)),
            Cell::new(drift.kind),
            Cell::new(format_display_date(drift.occurred_on)),
            Cell::new(drift.stored).fg(Color::Red),
            Cell::new(drift.expected).fg(Color::Green),
        ]);
    }
    println!("{}\n", table);

    match fixed {
        Some(count) => output::success(&format!("Fixed {} transaction(s)", count)),
        None => output::warning(&format!(
            "{} transaction(s) out of date. Run with --fix to update them.",
            drifts.len()
        )),
    }
    Ok(())
}
