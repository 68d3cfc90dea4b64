//! List command - transactions for a period

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comfy_table::Cell;

use competencia_core::domain::format_display_date;
use competencia_core::services::TransactionFilter;
use competencia_core::{OperationResult, ReferencePeriod, Transaction, TransactionKind};

use super::{get_context, parse_kind, parse_period, GlobalOpts};
use crate::output;

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Reference period, e.g. "Fevereiro 2026"
    #[arg(long, short, value_parser = parse_period)]
    pub period: Option<ReferencePeriod>,
    #[arg(long, short, value_parser = parse_kind)]
    pub kind: Option<TransactionKind>,
    #[arg(long, short)]
    pub category: Option<String>,
    /// Case-insensitive match on the description
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> TransactionFilter {
        TransactionFilter {
            period: self.period,
            kind: self.kind,
            category: self.category.clone(),
            search: self.search.clone(),
        }
    }
}

pub fn run(opts: &GlobalOpts, args: FilterArgs) -> Result<()> {
    let ctx = get_context(opts)?;
    let txs = ctx.transaction_service.list(&args.to_filter())?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&txs))?);
        return Ok(());
    }

    if txs.is_empty() {
        println!("{}", "No transactions found.".dimmed());
        return Ok(());
    }

    println!("{}", render_table(&txs));
    println!("{}", format!("{} transaction(s)", txs.len()).dimmed());
    Ok(())
}

pub fn render_table(txs: &[Transaction]) -> comfy_table::Table {
    let mut table = output::create_table();
    table.set_header(vec![
        "Id", "Date", "Period", "Category", "Description", "Amount", "Status", "",
    ]);
    for tx in txs {
        table.add_row(vec![
            Cell::new(output::short_id(&tx.id)),
            Cell::new(format_display_date(tx.occurred_on)),
            Cell::new(tx.reference_period),
            Cell::new(&tx.category),
            Cell::new(&tx.description),
            Cell::new(output::signed_amount(tx.kind, tx.amount)),
            Cell::new(output::status_label(tx.status)),
            Cell::new(if tx.recurring { "↻" } else { "" }),
        ]);
    }
    table
}
