//! Summary command - totals, category breakdown and insights for a period

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};

use competencia_core::services::{Insight, PeriodSummary, TransactionFilter};
use competencia_core::{OperationResult, ReferencePeriod};

use super::{get_context, parse_period, GlobalOpts};
use crate::output;

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Reference period, defaults to the current one
    #[arg(long, short, value_parser = parse_period, conflicts_with = "all")]
    pub period: Option<ReferencePeriod>,
    /// Summarize every period together
    #[arg(long)]
    pub all: bool,
}

pub fn run(opts: &GlobalOpts, args: SummaryArgs) -> Result<()> {
    let ctx = get_context(opts)?;
    let txs = ctx.transaction_service.list(&TransactionFilter::default())?;

    let period = if args.all {
        None
    } else {
        Some(
            args.period
                .unwrap_or_else(|| ReferencePeriod::from_date(ctx.clock.today())),
        )
    };
    let summary = ctx.summary_service.summarize(&txs, period);
    let insights = period
        .map(|p| ctx.summary_service.insights(&txs, p))
        .unwrap_or_default();

    if opts.json {
        let data = serde_json::json!({
            "summary": summary,
            "insights": insights,
            "availablePeriods": ctx.summary_service.available_periods(&txs),
        });
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
        return Ok(());
    }

    print_summary(&summary);
    if !insights.is_empty() {
        println!("\n{}", "Insights".bold());
        for insight in &insights {
            println!("  • {}", describe_insight(insight));
        }
    }
    println!();
    Ok(())
}

fn print_summary(summary: &PeriodSummary) {
    let title = summary
        .period
        .map(|p| p.to_string())
        .unwrap_or_else(|| "All periods".to_string());
    println!("\n{}\n", title.bold());

    let balance = output::format_currency(summary.balance);
    let balance = if summary.balance.is_sign_negative() {
        balance.red()
    } else {
        balance.green()
    };
    println!("  Income:   {}", output::format_currency(summary.income_total).green());
    println!("  Expenses: {}", output::format_currency(summary.expense_total).red());
    println!("  Balance:  {}", balance);
    println!(
        "  Pending:  {}",
        output::format_currency(summary.pending_expense_total).yellow()
    );
    println!("  {}", format!("{} transaction(s)", summary.transaction_count).dimmed());

    if summary.expenses_by_category.is_empty() {
        return;
    }
    let mut table = output::create_table();
    table.set_header(vec!["Category", "Total", "Share"]);
    for row in &summary.expenses_by_category {
        table.add_row(vec![
            Cell::new(&row.category),
            Cell::new(output::format_currency(row.total)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}%", row.share)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\n{}", table);
}

fn describe_insight(insight: &Insight) -> String {
    match insight {
        Insight::IncomeChange {
            previous_period,
            change_percent,
        } => {
            let direction = if change_percent.is_sign_negative() { "down" } else { "up" };
            format!(
                "Income {} {}% compared to {}",
                direction,
                change_percent.abs(),
                previous_period
            )
        }
        Insight::TopExpenseCategory { category, total } => {
            format!("Biggest expense: {} ({})", category, output::format_currency(*total))
        }
        Insight::PendingExpenses { total } => {
            format!("{} still to pay", output::format_currency(*total))
        }
        Insight::ExpensesBelowAverage { saved, .. } => {
            format!("You spent {} less than your monthly average", output::format_currency(*saved))
        }
        Insight::ExpensesAboveAverage { excess, .. } => {
            format!("Spending is {} above your monthly average", output::format_currency(*excess))
        }
        Insight::WeekendSpending => "You spend more on weekends".to_string(),
        Insight::Stable => "No notable changes this period".to_string(),
    }
}
