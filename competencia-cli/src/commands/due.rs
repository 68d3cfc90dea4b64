//! Due command - pending expenses dated today or earlier

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;

use competencia_core::services::TransactionFilter;
use competencia_core::OperationResult;

use super::list::render_table;
use super::{get_context, GlobalOpts};
use crate::output;

pub fn run(opts: &GlobalOpts) -> Result<()> {
    let ctx = get_context(opts)?;
    let today = ctx.clock.today();
    let txs = ctx.transaction_service.list(&TransactionFilter::default())?;
    let due = ctx.summary_service.due_expenses(&txs, today);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&due))?);
        return Ok(());
    }

    if due.is_empty() {
        output::success("Nothing due");
        return Ok(());
    }

    let overdue = due.iter().filter(|tx| tx.occurred_on < today).count();
    println!("{}", render_table(&due));
    let total: Decimal = due.iter().map(|tx| tx.amount).sum();
    output::warning(&format!(
        "{} bill(s) due, {} overdue, {} in total",
        due.len(),
        overdue,
        output::format_currency(total)
    ));
    if overdue > 0 {
        println!("{}", "Mark paid with `cpt toggle <id>`".dimmed());
    }
    Ok(())
}
