use std::cell::OnceCell;

use rust_decimal::Decimal;
use time::Date;

/// A single transaction row recovered from a statement.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Transaction {
    /// Date of the transaction, with the year resolved against the
    /// statement date.
    pub date: Date,
    /// Middle columns of the row, joined by single spaces.
    pub description: String,
    /// Signed amount. Credits are negative. None if the amount column
    /// could not be read as a number.
    pub amount: Option<Decimal>,
    /// Original-currency annotation, eg. "USD 49.99", kept verbatim.
    pub foreign_amount: Option<String>,
    /// The statement date in effect when this row was read.
    pub statement_date: Option<Date>,
    /// Name of the document the row came from, if known.
    pub source: Option<String>,
}

/// The lines of one statement, plus its statement date once it is found.
///
/// The statement date may only be set once. Later date clues in the same
/// document are ignored.
#[derive(Debug, Default)]
pub struct StatementDocument {
    lines: Vec<String>,
    statement_date: OnceCell<Date>,
}

impl StatementDocument {
    pub fn from_lines(lines: Vec<String>) -> StatementDocument {
        StatementDocument { lines, statement_date: OnceCell::new() }
    }

    /// Splits extracted text into lines. CR line endings are dropped.
    pub fn from_text(text: &str) -> StatementDocument {
        Self::from_lines(
            text.split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect(),
        )
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn statement_date(&self) -> Option<Date> {
        self.statement_date.get().copied()
    }

    /// Returns false (and changes nothing) if the date was already resolved.
    pub fn resolve_statement_date(&self, date: Date) -> bool {
        self.statement_date.set(date).is_ok()
    }
}
