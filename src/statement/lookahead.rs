use super::currency::find_foreign_amount;

/// How many lines after a transaction may hold its foreign amount.
pub const FOREIGN_AMOUNT_WINDOW: usize = 2;

// Shorter lines can't hold "<code> <amount>".
const MIN_ANNOTATION_CHARS: usize = 4;

/// Looks for a foreign-currency annotation in the lines following a
/// transaction. Nothing is consumed.
///
/// Every line in the window is searched, including blank lines and other
/// transaction lines, so the same annotation can be found for more than one
/// transaction.
pub fn find_foreign_amount_after(upcoming: &[String], window: usize) -> Option<String> {
    upcoming
        .iter()
        .take(window)
        .map(|line| line.trim())
        .filter(|line| line.chars().count() >= MIN_ANNOTATION_CHARS)
        .find_map(find_foreign_amount)
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::{find_foreign_amount_after, FOREIGN_AMOUNT_WINDOW};

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn find(v: &[&str]) -> Option<String> {
        find_foreign_amount_after(&lines(v), FOREIGN_AMOUNT_WINDOW)
    }

    #[test]
    fn test_found() {
        assert_eq!(find(&["      USD 49.99", "Ref No. : 7452"]), Some("USD 49.99".to_string()));
        assert_eq!(find(&["Ref No. : 7452", "GBP 165.20"]), Some("GBP 165.20".to_string()));
        assert_eq!(find(&["", "  usd 3.49  "]), Some("usd 3.49".to_string()));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(find(&[]), None);
        assert_eq!(find(&["", "", "USD 49.99"]), None);
        assert_eq!(find(&["abc", "x", "USD 49.99"]), None);
        assert_eq!(find(&["SUB TOTAL      314.46"]), None);
    }

    #[test]
    fn test_reaches_past_next_transaction() {
        assert_eq!(
            find(&["16 JUL   14 JUL   AMAZON MKTPLACE PMTS   68.43", "USD 49.99"]),
            Some("USD 49.99".to_string())
        );
        // An annotation on the next transaction line itself
        assert_eq!(
            find(&["16 JUL   AMAZON USD 49.99   68.43", "GBP 10.00"]),
            Some("USD 49.99".to_string())
        );
    }

    #[test]
    fn test_window_size() {
        let ls = lines(&["line one", "line two", "USD 49.99"]);
        assert_eq!(find_foreign_amount_after(&ls, 2), None);
        assert_eq!(find_foreign_amount_after(&ls, 3), Some("USD 49.99".to_string()));
    }
}
