//! Currency formatting for replies

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency suffix appended to formatted totals
pub const CURRENCY_SUFFIX: &str = "₫";

/// Format a number the vi-VN way: `.` groups thousands, `,` separates
/// decimals, at most three fraction digits.
/// e.g. `1234567.5` → `"1.234.567,5"`
pub fn format_number(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let grouped: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(".");

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{sign}{grouped},{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Format an amount in dong, e.g. `170000` → `"170.000 ₫"`
pub fn format_vnd(value: Decimal) -> String {
    format!("{} {}", format_number(value), CURRENCY_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_vnd() {
        assert_eq!(format_vnd(dec("170000")), "170.000 ₫");
        assert_eq!(format_vnd(dec("50000")), "50.000 ₫");
        assert_eq!(format_vnd(dec("0")), "0 ₫");
        assert_eq!(format_vnd(dec("999")), "999 ₫");
        assert_eq!(format_vnd(dec("1000")), "1.000 ₫");
    }

    #[test]
    fn test_format_number_fractions() {
        assert_eq!(format_number(dec("1234567.5")), "1.234.567,5");
        assert_eq!(format_number(dec("12.50")), "12,5");
        assert_eq!(format_number(dec("0.12345")), "0,123");
        assert_eq!(format_number(dec("0.0005")), "0,001");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(dec("-1500")), "-1.500");
        assert_eq!(format_number(dec("-0.0001")), "0");
    }
}
