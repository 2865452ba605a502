use crate::statement::Transaction;
use crate::util::date::format_standard_date;
use crate::util::rw::WriteHandle;

pub type Error = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
    Pretty,
}

pub const COLUMNS: [&str; 6] = [
    "date",
    "description",
    "amount",
    "foreign_amount",
    "statement_date",
    "source",
];

/// Sink for transaction rows. Rows are written in the order given, one
/// document at a time.
pub trait TransactionWriter {
    fn write_transactions(&mut self, txs: &[Transaction]) -> Result<(), Error>;

    fn finish(self: Box<Self>) -> Result<(), Error> {
        Ok(())
    }
}

/// A transaction as text cells, in COLUMNS order. Absent values are empty.
pub fn render_row(tx: &Transaction) -> Vec<String> {
    vec![
        format_standard_date(&tx.date),
        tx.description.clone(),
        tx.amount.map(|a| a.to_string()).unwrap_or_default(),
        tx.foreign_amount.clone().unwrap_or_default(),
        tx.statement_date.as_ref().map(format_standard_date).unwrap_or_default(),
        tx.source.clone().unwrap_or_default(),
    ]
}

pub fn new_writer(format: OutputFormat, w: WriteHandle) -> Box<dyn TransactionWriter> {
    match format {
        OutputFormat::Csv => Box::new(super::csv::CsvWriter::new(w)),
        OutputFormat::Json => Box::new(super::json::JsonWriter::new(w)),
        OutputFormat::Pretty => Box::new(super::text::TextWriter::new(w)),
    }
}
