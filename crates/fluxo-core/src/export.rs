//! Tabular export of transactions
//!
//! One row per transaction with a localized (pt-BR) date, a human-readable
//! kind label, category, description and a formatted amount:
//!
//! ```text
//! Data,Tipo,Categoria,Descrição,Valor
//! 05/03/2024,Saída,Food,Mercado,"R$ 1.234,56"
//! ```

use chrono::NaiveDate;

use crate::db::{Database, TransactionFilter};
use crate::error::{Error, Result};
use crate::models::Transaction;

pub const CSV_HEADER: [&str; 5] = ["Data", "Tipo", "Categoria", "Descrição", "Valor"];

/// `dd/mm/yyyy`
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Brazilian currency format: `R$ 1.234,56`
pub fn format_brl(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, frac_part)
}

/// Render transactions as CSV, in the order given
pub fn transactions_to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for tx in transactions {
        writer.write_record([
            format_date_br(tx.date).as_str(),
            tx.kind.label(),
            tx.category.as_str(),
            tx.description.as_str(),
            format_brl(tx.amount).as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidInput(format!("Export is not UTF-8: {}", e)))
}

impl Database {
    /// Export the owner's transactions matching `filter` (newest first)
    pub fn export_transactions_csv(
        &self,
        filter: TransactionFilter<'_>,
        limit: i64,
    ) -> Result<String> {
        let transactions = self.search_transactions(filter, limit)?;
        transactions_to_csv(&transactions)
    }
}
