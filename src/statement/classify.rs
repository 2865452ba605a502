use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use super::date::{DateFragment, DateParser};

lazy_static! {
    // Layout text lines up columns with runs of spaces.
    static ref FIELD_SEPARATOR_RE: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Splits a trimmed line into its columns.
pub fn split_fields(line: &str) -> Vec<&str> {
    FIELD_SEPARATOR_RE.split(line).collect()
}

/// Which columns of a row hold the description and the amount.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FieldLayout {
    pub description: Range<usize>,
    pub amount: usize,
}

/// A bank-specific way of reading a row's columns.
///
/// Rules are tried in order, and the first one to return a layout is used.
/// They are only consulted for lines that already look like transactions.
pub trait LineRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn layout(&self, fields: &[&str]) -> Option<FieldLayout>;
}

/// Layouts with a standalone "$" column. The description ends before the
/// first one.
pub struct DollarSentinelRule;

impl LineRule for DollarSentinelRule {
    fn name(&self) -> &'static str {
        "dollar-sentinel"
    }

    fn layout(&self, fields: &[&str]) -> Option<FieldLayout> {
        let dollar = fields.iter().position(|f| *f == "$")?;
        Some(FieldLayout {
            description: 1..dollar.max(1),
            amount: fields.len() - 1,
        })
    }
}

/// Date, description columns, then the amount last.
pub struct TrailingAmountRule;

impl LineRule for TrailingAmountRule {
    fn name(&self) -> &'static str {
        "trailing-amount"
    }

    fn layout(&self, fields: &[&str]) -> Option<FieldLayout> {
        let last = fields.len().checked_sub(1)?;
        Some(FieldLayout { description: 1..last.max(1), amount: last })
    }
}

/// What a transaction line is made of, before dates and amounts are
/// resolved.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RawTransaction {
    pub date: DateFragment,
    pub description: String,
    pub amount_field: String,
    pub rule: &'static str,
}

pub const MIN_FIELDS: usize = 3;
pub const MIN_DATE_FIELD_CHARS: usize = 5;

pub struct TransactionLineClassifier {
    date_parser: DateParser,
    rules: Vec<Box<dyn LineRule>>,
}

impl Default for TransactionLineClassifier {
    fn default() -> Self {
        Self::new(DateParser::default())
    }
}

impl TransactionLineClassifier {
    pub fn new(date_parser: DateParser) -> TransactionLineClassifier {
        TransactionLineClassifier {
            date_parser,
            rules: vec![Box::new(DollarSentinelRule), Box::new(TrailingAmountRule)],
        }
    }

    /// Tries `rule` before the existing ones.
    pub fn with_rule(mut self, rule: Box<dyn LineRule>) -> Self {
        self.rules.insert(0, rule);
        self
    }

    /// A line is a transaction if it has at least three columns and its
    /// first column is a date of five or more characters.
    pub fn classify(&self, line: &str) -> Option<RawTransaction> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let fields = split_fields(line);
        if fields.len() < MIN_FIELDS || fields[0].chars().count() < MIN_DATE_FIELD_CHARS {
            return None;
        }
        let date = self.date_parser.parse(fields[0])?;

        for rule in &self.rules {
            if let Some(layout) = rule.layout(&fields) {
                let description = fields
                    .get(layout.description.clone())
                    .unwrap_or_default()
                    .join(" ");
                let amount_field = fields.get(layout.amount)?.to_string();
                return Some(RawTransaction {
                    date,
                    description,
                    amount_field,
                    rule: rule.name(),
                });
            }
        }
        None
    }
}
