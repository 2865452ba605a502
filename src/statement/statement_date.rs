use time::Date;

use super::classify::split_fields;
use super::date::{resolve_year, DateParser};

/// Phrases that introduce the statement date, checked in this order.
pub const DATE_CLUES: &[&str] = &["statement date", "as at"];

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct LocatedStatementDate {
    pub date: Date,
    /// How many of the following lines the date was read from (and so
    /// should be consumed). Zero when it was on the clue line itself.
    pub consumed: usize,
}

/// Finds the statement date from a clue phrase, either on the same line
/// after the clue, or as the first column of the next non-blank line.
#[derive(Clone, Debug)]
pub struct StatementDateLocator {
    clues: Vec<String>,
    date_parser: DateParser,
}

impl Default for StatementDateLocator {
    fn default() -> Self {
        Self::new(DateParser::default())
    }
}

impl StatementDateLocator {
    pub fn new(date_parser: DateParser) -> StatementDateLocator {
        Self::with_clues(date_parser, DATE_CLUES.iter().map(|c| c.to_string()).collect())
    }

    pub fn with_clues(date_parser: DateParser, clues: Vec<String>) -> StatementDateLocator {
        StatementDateLocator {
            clues: clues.into_iter().map(|c| c.to_lowercase()).collect(),
            date_parser,
        }
    }

    /// `upcoming` are the lines after `line`, not yet consumed. They are
    /// only read here. A date without a year takes the year nearest to
    /// `reference`.
    pub fn locate(
        &self,
        line: &str,
        upcoming: &[String],
        reference: &Date,
    ) -> Option<LocatedStatementDate> {
        let lower = line.to_lowercase();
        for clue in &self.clues {
            let Some((_, remainder)) = lower.rsplit_once(clue.as_str()) else {
                continue;
            };

            if let Some(date) = self.parse_date(remainder, reference) {
                return Some(LocatedStatementDate { date, consumed: 0 });
            }
            let remainder = remainder.trim();
            if let Some(first) = split_fields(remainder).first() {
                if let Some(date) = self.parse_date(first, reference) {
                    return Some(LocatedStatementDate { date, consumed: 0 });
                }
            }

            let next = upcoming.iter().position(|l| !l.trim().is_empty());
            if let Some(idx) = next {
                let next_line = upcoming[idx].trim();
                if let Some(date) = split_fields(next_line)
                    .first()
                    .and_then(|f| self.parse_date(f, reference))
                {
                    return Some(LocatedStatementDate { date, consumed: idx + 1 });
                }
            }
            tracing::debug!("Found date clue {:?} without a date: {:?}", clue, line);
        }
        None
    }

    fn parse_date(&self, text: &str, reference: &Date) -> Option<Date> {
        let frag = self.date_parser.parse(text)?;
        frag.to_date().or_else(|| resolve_year(&frag, reference))
    }
}
