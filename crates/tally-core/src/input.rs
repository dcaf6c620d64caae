//! Parsing free-text expense input (`name, amount, category, dd-mm-yyyy`)

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::NewExpense;
use crate::partition::ExpenseDate;

/// Field layout shown to users when asking for an expense
pub const EXPENSE_FORMAT: &str = "name, amount, category, dd-mm-yyyy";

/// Largest accepted amount (one quadrillion dong)
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Parse and validate an expense from a single chat message
pub fn parse_expense(text: &str) -> Result<NewExpense> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [name, amount, category, date] = fields.as_slice() else {
        return Err(Error::invalid(format!(
            "Expected 4 comma-separated fields ({}), got {}",
            EXPENSE_FORMAT,
            fields.len()
        )));
    };

    if name.is_empty() {
        return Err(Error::invalid("Name must not be empty"));
    }
    if category.is_empty() {
        return Err(Error::invalid("Category must not be empty"));
    }

    parse_amount(amount)?;

    Ok(NewExpense {
        name: name.to_string(),
        amount: amount.to_string(),
        category: category.to_string(),
        date: ExpenseDate::parse(date)?,
    })
}

/// Parse an amount: digits with an optional fractional part, at most `MAX_AMOUNT`.
///
/// Signs, digit separators and exponents are rejected so the stored text
/// always reads as the number it totals to.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let text = text.trim();
    if text.starts_with('-') {
        return Err(Error::invalid(format!(
            "Amount must not be negative, got \"{}\"",
            text
        )));
    }

    let not_a_number = || Error::invalid(format!("Amount must be a number, got \"{}\"", text));
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.map_or(true, all_digits) {
        return Err(not_a_number());
    }

    let amount = Decimal::from_str(text).map_err(|_| not_a_number())?;
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(Error::invalid(format!(
            "Amount must be at most {}, got \"{}\"",
            MAX_AMOUNT, text
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expense() {
        let expense = parse_expense("Coffee, 50000, Food, 01-03-2024").unwrap();
        assert_eq!(expense.name, "Coffee");
        assert_eq!(expense.amount, "50000");
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.date.as_str(), "01-03-2024");
        assert_eq!(expense.partition().to_string(), "T03-2024");
    }

    #[test]
    fn test_parse_expense_tolerates_spacing() {
        let expense = parse_expense("Banh mi,25000 ,  Food,5-3-2024").unwrap();
        assert_eq!(expense.name, "Banh mi");
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.date.as_str(), "5-3-2024");
    }

    #[test]
    fn test_parse_expense_keeps_amount_as_typed() {
        for typed in ["12.50", "050000", "50000.0", "0"] {
            let text = format!("Tea, {} , Food, 01-03-2024", typed);
            assert_eq!(parse_expense(&text).unwrap().amount, typed);
        }
    }

    #[test]
    fn test_parse_expense_wrong_field_count() {
        let err = parse_expense("Coffee, 50000, Food").unwrap_err();
        assert!(err.to_string().contains("got 3"));
        assert!(parse_expense("a, 1, b, 01-01-2024, extra").is_err());
        assert!(parse_expense("").is_err());
    }

    #[test]
    fn test_parse_expense_rejects_bad_fields() {
        assert!(parse_expense(", 1, Food, 01-01-2024").is_err());
        assert!(parse_expense("Coffee, 1, , 01-01-2024").is_err());
        assert!(parse_expense("Coffee, abc, Food, 01-01-2024").is_err());
        assert!(parse_expense("Coffee, -5, Food, 01-01-2024").is_err());
        assert!(parse_expense("Coffee, 5, Food, 2024-01-01").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount(" 120000 ").unwrap(), Decimal::from(120000));
        assert_eq!(parse_amount("12.50").unwrap(), Decimal::new(1250, 2));
        assert!(parse_amount("1,000").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_parse_amount_rejects_lenient_notation() {
        for text in ["+50000", "1_000", "1e5", ".5", "5.", "1.2.3", "", " "] {
            assert!(parse_amount(text).is_err(), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_parse_amount_limit() {
        assert_eq!(
            parse_amount("1000000000000000").unwrap(),
            Decimal::from(MAX_AMOUNT)
        );
        let err = parse_amount("1000000000000000.5").unwrap_err();
        assert!(err.to_string().contains("at most"));
        assert!(parse_amount("70000000000000000000000000000").is_err());
    }
}
