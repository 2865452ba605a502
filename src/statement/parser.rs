use time::Date;

use super::amount::parse_amount;
use super::classify::TransactionLineClassifier;
use super::cursor::ParseCursor;
use super::date::{resolve_transaction_date, DateParser};
use super::lookahead::{find_foreign_amount_after, FOREIGN_AMOUNT_WINDOW};
use super::model::{StatementDocument, Transaction};
use super::statement_date::StatementDateLocator;
use crate::util::date::today_local;

#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Recorded on every row.
    pub source: Option<String>,
    /// Reference for year resolution when a statement has no statement date.
    pub today: Date,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { source: None, today: today_local() }
    }
}

impl ParseOptions {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

pub struct StatementParser {
    classifier: TransactionLineClassifier,
    locator: StatementDateLocator,
    foreign_amount_window: usize,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new(TransactionLineClassifier::default(), StatementDateLocator::default())
    }
}

impl StatementParser {
    pub fn new(
        classifier: TransactionLineClassifier,
        locator: StatementDateLocator,
    ) -> StatementParser {
        StatementParser { classifier, locator, foreign_amount_window: FOREIGN_AMOUNT_WINDOW }
    }

    pub fn with_date_parser(date_parser: DateParser) -> StatementParser {
        Self::new(
            TransactionLineClassifier::new(date_parser),
            StatementDateLocator::new(date_parser),
        )
    }

    /// Extracts the transaction rows of a document, in line order.
    ///
    /// The first date clue that yields a date fixes the statement date for
    /// the rest of the document. Rows before it take the statement date as
    /// unknown.
    pub fn parse(&self, doc: &StatementDocument, options: &ParseOptions) -> Vec<Transaction> {
        let mut cursor = ParseCursor::new(doc.lines());
        let mut txs = Vec::new();
        let mut warned_no_statement_date = false;

        while let Some(raw_line) = cursor.next_line() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if doc.statement_date().is_none() {
                if let Some(found) = self.locator.locate(line, cursor.remaining(), &options.today)
                {
                    tracing::debug!(
                        "Statement date {} found at line {}",
                        found.date,
                        cursor.position()
                    );
                    doc.resolve_statement_date(found.date);
                    cursor.skip(found.consumed);
                }
            }

            let Some(raw) = self.classifier.classify(line) else {
                continue;
            };
            tracing::trace!("Transaction line ({}): {:?}", raw.rule, line);

            let statement_date = doc.statement_date();
            if statement_date.is_none() && !warned_no_statement_date {
                tracing::warn!(
                    "No statement date found before transactions in {}. Using {} as the reference date",
                    options.source.as_deref().unwrap_or("<unnamed document>"),
                    options.today
                );
                warned_no_statement_date = true;
            }

            let Some(date) =
                resolve_transaction_date(&raw.date, statement_date.as_ref(), &options.today)
            else {
                tracing::warn!("Skipping line with a date that does not exist: {:?}", line);
                continue;
            };

            let foreign_amount =
                find_foreign_amount_after(cursor.remaining(), self.foreign_amount_window);

            txs.push(Transaction {
                date,
                description: raw.description,
                amount: parse_amount(&raw.amount_field),
                foreign_amount,
                statement_date,
                source: options.source.clone(),
            });
        }

        tracing::debug!("Found {} transactions", txs.len());
        txs
    }
}

/// Parses extracted statement text with the default rules.
pub fn parse_statement_text(text: &str, options: &ParseOptions) -> Vec<Transaction> {
    let doc = StatementDocument::from_text(text);
    StatementParser::default().parse(&doc, options)
}
