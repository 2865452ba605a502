use std::cell::RefCell;

use chrono::Datelike;
pub use time::Date;
use time::{macros::format_description, Month, UtcOffset};

pub type StaticDateFormat<'a> =
    &'static [time::format_description::BorrowedFormatItem<'a>];

pub const STANDARD_DATE_FORMAT: StaticDateFormat =
    format_description!("[year]-[month]-[day]");

pub fn parse_standard_date(date_str: &str) -> Result<Date, time::error::Parse> {
    Date::parse(date_str, STANDARD_DATE_FORMAT)
}

pub fn format_standard_date(d: &Date) -> String {
    d.format(STANDARD_DATE_FORMAT).unwrap_or_else(|_| d.to_string())
}

fn date_naive_to_date(dn: &chrono::NaiveDate) -> Option<Date> {
    Date::from_calendar_date(
        dn.year(),
        Month::December.nth_next(dn.month() as u8),
        dn.day() as u8,
    )
    .ok()
}

const MONTH_NAMES: [(&str, Month); 12] = [
    ("january", Month::January),
    ("february", Month::February),
    ("march", Month::March),
    ("april", Month::April),
    ("may", Month::May),
    ("june", Month::June),
    ("july", Month::July),
    ("august", Month::August),
    ("september", Month::September),
    ("october", Month::October),
    ("november", Month::November),
    ("december", Month::December),
];

/// Parses an English month name or abbreviation ("Aug", "aug.", "August", "Sept").
///
/// The text must be a prefix of the full name of at least three letters, so
/// "marine" or "ma" are rejected.
pub fn parse_month(m: &str) -> Result<Month, ()> {
    let m_lower = m.trim().trim_end_matches('.').to_lowercase();
    if m_lower.chars().count() < 3 {
        return Err(());
    }
    if m_lower == "sept" {
        return Ok(Month::September);
    }
    MONTH_NAMES
        .iter()
        .find(|(name, _)| name.starts_with(m_lower.as_str()))
        .map(|(_, month)| *month)
        .ok_or(())
}

/// Greatest day number the month can have in any year (Feb allows 29).
pub fn max_days_in_month(month: Month) -> u8 {
    // 2000 is a leap year
    time::util::days_in_year_month(2000, month)
}

/// Absolute distance between two dates, in days.
pub fn days_apart(a: &Date, b: &Date) -> i64 {
    (*a - *b).whole_days().abs()
}

thread_local! {
    static TODAYS_DATE_FOR_TEST_TL: RefCell<Date> = RefCell::new(Date::MIN);
}

pub fn set_todays_date_for_test(d: Date) {
    TODAYS_DATE_FOR_TEST_TL.with_borrow_mut(|d_| *d_ = d);
}

pub fn today_local() -> Date {
    let test_date: Date = TODAYS_DATE_FOR_TEST_TL.with_borrow(|d| *d);
    if test_date != Date::MIN {
        return test_date;
    }
    let now = chrono::offset::Local::now();
    date_naive_to_date(&now.date_naive()).unwrap_or(Date::MIN)
}

// Gets the current system UtcOffset of the local timezone.
// UtcOffset::current_local_offset refuses to work on Linux without an
// "unsafe" opt-in, so go through chrono instead.
pub fn local_utc_offset() -> Result<UtcOffset, time::error::ComponentRange> {
    let now = chrono::offset::Local::now();
    let offset = now.offset();
    UtcOffset::from_whole_seconds(-offset.utc_minus_local())
}

// Used by both unit and integration tests
pub mod pub_testlib {
    use time::{Date, Month};

    pub fn ymd(year: i32, month: u8, day: u8) -> Date {
        Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use time::{Date, Month};

    use super::pub_testlib::ymd;
    use super::{
        date_naive_to_date, days_apart, format_standard_date, max_days_in_month,
        parse_month, parse_standard_date, set_todays_date_for_test, today_local,
    };

    #[test]
    fn test_parse() {
        let d = parse_standard_date("2023-01-21");
        assert_eq!(
            d.unwrap(),
            Date::from_calendar_date(2023, Month::January, 21).unwrap()
        );

        let d = parse_standard_date("2023-01-41");
        assert!(d.is_err());
    }

    #[test]
    fn test_render() {
        assert_eq!(format_standard_date(&ymd(2016, 3, 4)), "2016-03-04");
        assert_eq!(ymd(2024, 1, 23).to_string(), "2024-01-23");
    }

    #[test]
    fn test_date_naive_to_date() {
        let naive_date = NaiveDate::from_ymd_opt(2024, 4, 13).unwrap();
        assert_eq!(date_naive_to_date(&naive_date), Some(ymd(2024, 4, 13)));
    }

    #[test]
    #[rustfmt::skip]
    fn test_parse_month() {
        assert_eq!(parse_month("Jan"), Ok(Month::January));
        assert_eq!(parse_month("JUL"), Ok(Month::July));
        assert_eq!(parse_month("august"), Ok(Month::August));
        assert_eq!(parse_month("Sept"), Ok(Month::September));
        assert_eq!(parse_month("sep."), Ok(Month::September));
        assert_eq!(parse_month(" Dec "), Ok(Month::December));

        assert_eq!(parse_month("ma"), Err(()));
        assert_eq!(parse_month("marine"), Err(()));
        assert_eq!(parse_month("julyy"), Err(()));
        assert_eq!(parse_month("date"), Err(()));
        assert_eq!(parse_month(""), Err(()));
    }

    #[test]
    fn test_max_days_in_month() {
        assert_eq!(max_days_in_month(Month::February), 29);
        assert_eq!(max_days_in_month(Month::April), 30);
        assert_eq!(max_days_in_month(Month::December), 31);
    }

    #[test]
    fn test_days_apart() {
        assert_eq!(days_apart(&ymd(2018, 1, 1), &ymd(2017, 12, 24)), 8);
        assert_eq!(days_apart(&ymd(2017, 12, 24), &ymd(2018, 1, 1)), 8);
        assert_eq!(days_apart(&ymd(2016, 4, 1), &ymd(2016, 4, 1)), 0);
    }

    #[test]
    fn test_today_override() {
        set_todays_date_for_test(ymd(2016, 8, 12));
        assert_eq!(today_local(), ymd(2016, 8, 12));
        set_todays_date_for_test(Date::MIN);
        assert_ne!(today_local(), Date::MIN);
    }
}
