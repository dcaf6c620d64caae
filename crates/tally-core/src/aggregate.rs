//! Category sums over a partition's expenses

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::Expense;

/// Which expenses a sum covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    /// Exact, case-sensitive category match
    Exact(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(wanted) => wanted == category,
        }
    }
}

/// Totals for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyStats {
    pub total: Decimal,
    /// Per-category totals in first-seen order
    pub by_category: Vec<(String, Decimal)>,
    pub expense_count: usize,
}

/// Sum the amounts of expenses matching `filter`.
///
/// Stored amounts are validated on entry, so a non-numeric amount means the
/// store was edited by hand. Such rows count as zero. A total past
/// `Decimal::MAX` is an `InvalidInput` error.
pub fn sum_by_category(expenses: &[Expense], filter: &CategoryFilter) -> Result<Decimal> {
    expenses
        .iter()
        .filter(|e| filter.matches(&e.category))
        .map(|e| match e.amount_value() {
            Some(amount) => amount,
            None => {
                warn!(id = %e.id, amount = %e.amount, "Non-numeric amount counted as zero");
                Decimal::ZERO
            }
        })
        .try_fold(Decimal::ZERO, |total, amount| {
            total.checked_add(amount).ok_or_else(|| {
                warn!(%total, %amount, "Sum overflowed");
                Error::invalid("The amounts are too large to add up")
            })
        })
}

/// Distinct categories in first-seen order
pub fn distinct_categories(expenses: &[Expense]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for expense in expenses {
        if !seen.iter().any(|c| c == &expense.category) {
            seen.push(expense.category.clone());
        }
    }
    seen
}

/// Total and per-category breakdown for a partition
pub fn monthly_stats(expenses: &[Expense]) -> Result<MonthlyStats> {
    let by_category = distinct_categories(expenses)
        .into_iter()
        .map(|category| {
            let sum = sum_by_category(expenses, &CategoryFilter::Exact(category.clone()))?;
            Ok((category, sum))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MonthlyStats {
        total: sum_by_category(expenses, &CategoryFilter::All)?,
        by_category,
        expense_count: expenses.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(id: &str, amount: &str, category: &str) -> Expense {
        Expense {
            id: id.to_string(),
            name: format!("item {}", id),
            amount: amount.to_string(),
            category: category.to_string(),
            date: "01-03-2024".to_string(),
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense("1", "50000", "Food"),
            expense("2", "120000", "Transport"),
            expense("3", "15000.5", "Food"),
            expense("4", "300000", "Rent"),
            expense("5", "2000", "food"),
        ]
    }

    #[test]
    fn test_sum_all() {
        assert_eq!(
            sum_by_category(&sample(), &CategoryFilter::All).unwrap(),
            Decimal::new(4870005, 1)
        );
    }

    #[test]
    fn test_sum_exact_is_case_sensitive() {
        let expenses = sample();
        assert_eq!(
            sum_by_category(&expenses, &CategoryFilter::Exact("Food".into())).unwrap(),
            Decimal::new(650005, 1)
        );
        assert_eq!(
            sum_by_category(&expenses, &CategoryFilter::Exact("food".into())).unwrap(),
            Decimal::from(2000)
        );
        assert_eq!(
            sum_by_category(&expenses, &CategoryFilter::Exact("Nope".into())).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_all_equals_sum_of_categories() {
        let expenses = sample();
        let per_category: Decimal = distinct_categories(&expenses)
            .into_iter()
            .map(|c| sum_by_category(&expenses, &CategoryFilter::Exact(c)).unwrap())
            .sum();
        assert_eq!(
            per_category,
            sum_by_category(&expenses, &CategoryFilter::All).unwrap()
        );
    }

    #[test]
    fn test_category_named_all_is_an_ordinary_category() {
        let expenses = vec![expense("1", "10", "all"), expense("2", "5", "Food")];
        assert_eq!(
            sum_by_category(&expenses, &CategoryFilter::Exact("all".into())).unwrap(),
            Decimal::from(10)
        );
        let stats = monthly_stats(&expenses).unwrap();
        assert_eq!(stats.by_category.len(), 2);
    }

    #[test]
    fn test_distinct_categories_first_seen_order() {
        assert_eq!(
            distinct_categories(&sample()),
            vec!["Food", "Transport", "Rent", "food"]
        );
        assert!(distinct_categories(&[]).is_empty());
    }

    #[test]
    fn test_non_numeric_amount_counts_as_zero() {
        let expenses = vec![expense("1", "abc", "Food"), expense("2", "7", "Food")];
        assert_eq!(
            sum_by_category(&expenses, &CategoryFilter::All).unwrap(),
            Decimal::from(7)
        );
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let huge = "70000000000000000000000000000";
        let expenses = vec![expense("1", huge, "Food"), expense("2", huge, "Food")];
        let err = sum_by_category(&expenses, &CategoryFilter::All).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(monthly_stats(&expenses).is_err());
    }

    #[test]
    fn test_monthly_stats() {
        let expenses = vec![
            expense("1", "50000", "Food"),
            expense("2", "120000", "Transport"),
        ];
        let stats = monthly_stats(&expenses).unwrap();
        assert_eq!(stats.total, Decimal::from(170000));
        assert_eq!(
            stats.by_category,
            vec![
                ("Food".to_string(), Decimal::from(50000)),
                ("Transport".to_string(), Decimal::from(120000)),
            ]
        );
        assert_eq!(stats.expense_count, 2);
    }
}
