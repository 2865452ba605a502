use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::statement::Transaction;
use crate::util::date::format_standard_date;
use crate::util::rw::WriteHandle;

use super::model::{Error, TransactionWriter};

// Amounts are written as JSON numbers. Missing values are null.
#[derive(Serialize)]
struct JsonTransaction {
    date: String,
    description: String,
    amount: Option<Decimal>,
    foreign_amount: Option<String>,
    statement_date: Option<String>,
    source: Option<String>,
}

impl From<&Transaction> for JsonTransaction {
    fn from(tx: &Transaction) -> Self {
        JsonTransaction {
            date: format_standard_date(&tx.date),
            description: tx.description.clone(),
            amount: tx.amount,
            foreign_amount: tx.foreign_amount.clone(),
            statement_date: tx.statement_date.as_ref().map(format_standard_date),
            source: tx.source.clone(),
        }
    }
}

/// Collects every row and writes a single JSON array on finish.
pub struct JsonWriter {
    w: WriteHandle,
    rows: Vec<JsonTransaction>,
}

impl JsonWriter {
    pub fn new(w: WriteHandle) -> JsonWriter {
        JsonWriter { w, rows: Vec::new() }
    }
}

impl TransactionWriter for JsonWriter {
    fn write_transactions(&mut self, txs: &[Transaction]) -> Result<(), Error> {
        self.rows.extend(txs.iter().map(JsonTransaction::from));
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut self.w, &self.rows).map_err(|e| e.to_string())?;
        writeln!(self.w).map_err(|e| e.to_string())?;
        self.w.flush().map_err(|e| e.to_string())
    }
}
