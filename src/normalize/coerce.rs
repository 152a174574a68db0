// src/normalize/coerce.rs
//! Per-cell text → value conversions. Each returns `None` when the cell can't be read.

use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("digit regex"));
static FOUR_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").expect("year regex"));

const BILLION: f64 = 1_000_000_000.0;

/// First contiguous run of digits, e.g. `"4RK"` → 4, `"[a] 12"` → 12.
///
/// A run too long for `i64` reads as missing, so its row is dropped. Rank and peak
/// cells are small positions, so this never bites real tables.
pub fn leading_integer(cell: &str) -> Option<i64> {
    DIGIT_RUN
        .find(cell)
        .and_then(|m| m.as_str().parse().ok())
}

/// First four consecutive digits, e.g. `"2009"`, `"Dec 2009[1]"`.
pub fn year(cell: &str) -> Option<i32> {
    FOUR_DIGITS
        .find(cell)
        .and_then(|m| m.as_str().parse().ok())
}

/// Dollar amount in billions: everything but digits and `.` is discarded first, so
/// `"$2,847,397,339"` → 2.847397339.
pub fn gross_billions(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().map(|v| v / BILLION)
}

pub fn title(cell: &str) -> Option<String> {
    let t = cell.trim();
    (!t.is_empty()).then(|| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_take_first_digit_run() {
        assert_eq!(leading_integer("1"), Some(1));
        assert_eq!(leading_integer("  14 "), Some(14));
        assert_eq!(leading_integer("4RK"), Some(4));
        assert_eq!(leading_integer("F8[# 2]"), Some(8));
        assert_eq!(leading_integer("—"), None);
        assert_eq!(leading_integer(""), None);
        assert_eq!(leading_integer("99999999999999999999999"), None);
    }

    #[test]
    fn year_needs_four_digits() {
        assert_eq!(year("2009"), Some(2009));
        assert_eq!(year("Dec 19, 1997"), Some(1997));
        assert_eq!(year("19"), None);
        assert_eq!(year("n/a"), None);
    }

    #[test]
    fn gross_strips_currency_and_scales() {
        let v = gross_billions("$2,847,397,339").unwrap();
        assert!((v - 2.847397339).abs() < 1e-12);
        assert_eq!(gross_billions("$1,500,000,000.00"), Some(1.5));
        assert_eq!(gross_billions("unknown"), None);
        assert_eq!(gross_billions("1.2.3"), None);
        assert_eq!(gross_billions(""), None);
    }

    #[test]
    fn title_rejects_blank() {
        assert_eq!(title("  Titanic "), Some("Titanic".to_string()));
        assert_eq!(title("   "), None);
    }
}
