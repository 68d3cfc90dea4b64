//! Export command - CSV report of the filtered transactions

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use competencia_core::LogEvent;

use super::list::FilterArgs;
use super::{get_context, get_logger, log_event, GlobalOpts};
use crate::output;

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(opts: &GlobalOpts, args: ExportArgs) -> Result<()> {
    let ctx = get_context(opts)?;
    let txs = ctx.transaction_service.list(&args.filter.to_filter())?;

    let rows = match &args.output {
        Some(path) => ctx
            .export_service
            .export_csv_to_path(&txs, path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => ctx.export_service.export_csv(&txs, std::io::stdout().lock())?,
    };

    let mut event = LogEvent::new("report_exported").with_command("export").with_count(rows);
    if let Some(period) = args.filter.period {
        event = event.with_period(period);
    }
    log_event(&get_logger(), event);

    if let Some(path) = &args.output {
        if opts.json {
            println!(
                "{}",
                serde_json::json!({"rows": rows, "path": path.to_string_lossy()})
            );
        } else {
            output::success(&format!("Exported {} row(s) to {}", rows, path.display()));
        }
    }
    Ok(())
}
