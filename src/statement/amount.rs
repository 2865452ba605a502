use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    // Parentheses, or a "cr" suffix, mark a credit.
    static ref CREDIT_MARKER_RE: Regex = Regex::new(r"[()]|cr").unwrap();
}

/// Parses the amount column of a transaction row.
///
/// Thousands separators are dropped. If a credit marker had to be removed to
/// get at the number, the amount is negated, so "1,380.77 CR" and "(40.59)"
/// both become negative. Exponent forms like "1.5e3" are accepted. Text that
/// still is not a number gives None, which is logged and otherwise ignored.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let amount_str = raw.trim().to_lowercase().replace(',', "");
    let cleaned = CREDIT_MARKER_RE.replace_all(&amount_str, "");
    let cleaned = cleaned.trim();

    let parsed = Decimal::from_str(cleaned)
        .or_else(|e| Decimal::from_scientific(cleaned).map_err(|_| e));
    match parsed {
        Ok(value) => {
            if cleaned != amount_str {
                Some(-value)
            } else {
                Some(value)
            }
        }
        Err(e) => {
            tracing::warn!("Failed to parse amount {:?}: {}", raw, e);
            None
        }
    }
}
