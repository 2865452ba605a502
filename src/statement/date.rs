use lazy_static::lazy_static;
use regex::Regex;
use time::{Date, Month};

use crate::util::date::{days_apart, max_days_in_month, parse_month};

lazy_static! {
    // 24/03, 24-03-2016, 24.03.16, 2016-03-24
    static ref NUMERIC_DATE_RE: Regex =
        Regex::new(r"^(\d{1,4})[/.\-](\d{1,2})(?:[/.\-](\d{2}|\d{4}))?$").unwrap();
    // 13 Jul, 13JUL, 13th July 2016, 13-Jul-16
    static ref DAY_MONTH_NAME_RE: Regex = Regex::new(
        r"^(\d{1,2})(?:st|nd|rd|th)?[\s/.\-]*([a-z]{3,9})\.?(?:[\s,/.\-]+(\d{2}|\d{4}))?$"
    ).unwrap();
    // Jul 13, July 13th, 2016
    static ref MONTH_NAME_DAY_RE: Regex = Regex::new(
        r"^([a-z]{3,9})\.?[\s/.\-]*(\d{1,2})(?:st|nd|rd|th)?(?:[\s,/.\-]+(\d{2}|\d{4}))?$"
    ).unwrap();
}

/// A day and month as read from the text. The year is only present if the
/// text carried one.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DateFragment {
    pub day: u8,
    pub month: Month,
    pub year: Option<i32>,
}

impl DateFragment {
    /// The date in the given year, ignoring any parsed year.
    /// None for Feb 29 in a non-leap year.
    pub fn in_year(&self, year: i32) -> Option<Date> {
        Date::from_calendar_date(year, self.month, self.day).ok()
    }

    /// The date using the parsed year, if there was one.
    pub fn to_date(&self) -> Option<Date> {
        self.year.and_then(|y| self.in_year(y))
    }
}

/// How to read all-numeric dates like 03/04.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum DayMonthOrder {
    #[default]
    DayFirst,
    MonthFirst,
}

/// Reads the short, free-form dates found in statement layouts.
///
/// Only whole-field matches count. Surrounding whitespace and ':' ',' '-' '.'
/// are ignored, but anything else left over makes the text not a date, so
/// "Statement Date" or "PREVIOUS BALANCE" are rejected rather than guessed at.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateParser {
    pub order: DayMonthOrder,
}

impl DateParser {
    pub fn new(order: DayMonthOrder) -> DateParser {
        DateParser { order }
    }

    pub fn parse(&self, text: &str) -> Option<DateFragment> {
        let cleaned = text
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-' | '.'))
            .to_lowercase();
        if cleaned.is_empty() {
            return None;
        }

        if let Some(caps) = NUMERIC_DATE_RE.captures(&cleaned) {
            let (a, b) = (&caps[1], &caps[2]);
            let c = caps.get(3).map(|m| m.as_str());
            return if a.len() == 4 {
                // ISO style. Year first always needs all three parts.
                fragment(c?, b, Some(a))
            } else if a.len() > 2 {
                None
            } else {
                match self.order {
                    DayMonthOrder::DayFirst => fragment(a, b, c),
                    DayMonthOrder::MonthFirst => fragment(b, a, c),
                }
            };
        }

        if let Some(caps) = DAY_MONTH_NAME_RE.captures(&cleaned) {
            let month = parse_month(&caps[2]).ok()?;
            return named_fragment(&caps[1], month, caps.get(3).map(|m| m.as_str()));
        }

        if let Some(caps) = MONTH_NAME_DAY_RE.captures(&cleaned) {
            let month = parse_month(&caps[1]).ok()?;
            return named_fragment(&caps[2], month, caps.get(3).map(|m| m.as_str()));
        }

        None
    }
}

fn fragment(day: &str, month: &str, year: Option<&str>) -> Option<DateFragment> {
    let month: u8 = month.parse().ok()?;
    named_fragment(day, Month::try_from(month).ok()?, year)
}

fn named_fragment(day: &str, month: Month, year: Option<&str>) -> Option<DateFragment> {
    let day: u8 = day.parse().ok()?;
    if day == 0 || day > max_days_in_month(month) {
        return None;
    }
    let year = match year {
        None => None,
        Some(y) => Some(parse_year(y)?),
    };
    let frag = DateFragment { day, month, year };
    if year.is_some() && frag.to_date().is_none() {
        // eg. 29/02/2015
        return None;
    }
    Some(frag)
}

// Two-digit years are assumed to be in the 21st century.
fn parse_year(y: &str) -> Option<i32> {
    let n: i32 = y.parse().ok()?;
    match y.len() {
        2 => Some(2000 + n),
        4 => Some(n),
        _ => None,
    }
}

/// Picks the year for a month/day that appeared without one, relative to a
/// reference date (normally the statement date).
///
/// Candidates are the reference year and the year before. The one closer to
/// the reference wins, and a tie goes to the reference year. A candidate
/// that does not exist (Feb 29) is dropped.
pub fn resolve_year(frag: &DateFragment, reference: &Date) -> Option<Date> {
    let same = frag.in_year(reference.year());
    let prev = frag.in_year(reference.year() - 1);
    match (same, prev) {
        (Some(s), Some(p)) => {
            if days_apart(&p, reference) < days_apart(&s, reference) {
                Some(p)
            } else {
                Some(s)
            }
        }
        (Some(s), None) => Some(s),
        (None, Some(p)) => Some(p),
        (None, None) => None,
    }
}

/// Resolves the full date of a transaction row.
///
/// With a statement date, any year in the text is replaced by the nearest
/// one around the statement date. Without one, an explicit year is kept, and
/// otherwise `today` stands in as the reference.
pub fn resolve_transaction_date(
    frag: &DateFragment,
    statement_date: Option<&Date>,
    today: &Date,
) -> Option<Date> {
    match statement_date {
        Some(sd) => resolve_year(frag, sd),
        None => frag.to_date().or_else(|| resolve_year(frag, today)),
    }
}
