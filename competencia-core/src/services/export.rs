//! Export service - CSV reports

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::format_display_date;
use crate::domain::result::Result;
use crate::domain::Transaction;

/// One CSV line; field order is the column order
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    date: String,
    description: &'a str,
    category: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    amount: String,
    status: &'static str,
    reference_period: String,
    recurring: bool,
}

impl<'a> From<&'a Transaction> for ReportRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            date: format_display_date(tx.occurred_on),
            description: &tx.description,
            category: &tx.category,
            kind: tx.kind.as_str(),
            amount: format!("{:.2}", tx.amount),
            status: tx.status.as_str(),
            reference_period: tx.reference_period.to_string(),
            recurring: tx.recurring,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Write a header and one row per transaction; returns the row count
    pub fn export_csv<W: Write>(&self, txs: &[Transaction], writer: W) -> Result<usize> {
        let mut csv = csv::Writer::from_writer(writer);
        for tx in txs {
            csv.serialize(ReportRow::from(tx))?;
        }
        if txs.is_empty() {
            csv.write_record(HEADER)?;
        }
        csv.flush()?;
        Ok(txs.len())
    }

    pub fn export_csv_to_path(&self, txs: &[Transaction], path: &Path) -> Result<usize> {
        let file = std::fs::File::create(path)?;
        self.export_csv(txs, file)
    }
}

/// Written explicitly for empty reports, where serde has no row to derive it from
const HEADER: [&str; 8] = [
    "date",
    "description",
    "category",
    "type",
    "amount",
    "status",
    "reference_period",
    "recurring",
];
