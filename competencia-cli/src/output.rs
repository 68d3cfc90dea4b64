//! Output formatting utilities

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use competencia_core::{TransactionKind, TransactionStatus};
use rust_decimal::Decimal;

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount as Brazilian currency, e.g. `R$ 1.234,56`
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.abs().round_dp(2);
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, frac_part)
}

/// Amount colored by direction
pub fn signed_amount(kind: TransactionKind, amount: Decimal) -> ColoredString {
    match kind {
        TransactionKind::Income => format!("+{}", format_currency(amount)).green(),
        TransactionKind::Expense => format!("-{}", format_currency(amount)).red(),
    }
}

pub fn status_label(status: TransactionStatus) -> ColoredString {
    match status {
        TransactionStatus::Pending => status.as_str().yellow(),
        TransactionStatus::Paid | TransactionStatus::Received => status.as_str().green(),
    }
}

/// First eight characters of an id, enough to pass back as a prefix
pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}
