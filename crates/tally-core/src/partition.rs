//! Monthly partition keys and expense date parsing
//!
//! Every expense lives in exactly one partition, named `T{MM}-{YYYY}` after the
//! month of its `dd-mm-yyyy` date. Each store also carries a `Template`
//! partition that only exists as a header placeholder.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};

/// Name of the placeholder partition every store is created with
pub const TEMPLATE_PARTITION: &str = "Template";

/// A month partition key. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PartitionKey {
    year: i32,
    month: u32,
}

impl PartitionKey {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        if !(1000..=9999).contains(&year) {
            return Err(Error::invalid(format!(
                "Year must have four digits, got {}",
                year
            )));
        }
        Ok(Self { year, month })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Parse a month selector as typed by the user (`mm-yyyy`, month may be one digit)
    pub fn parse_month_year(input: &str) -> Result<Self> {
        let input = input.trim();
        let parts: Vec<&str> = input.split('-').collect();
        let [month, year] = parts.as_slice() else {
            return Err(Error::invalid(format!(
                "Expected a month as mm-yyyy, got \"{}\"",
                input
            )));
        };
        let month = parse_number::<u32>(month, "month", input)?;
        let year = parse_year(year, input)?;
        Self::new(month, year)
    }

    /// Parse a stored partition name (`T03-2024`). `None` for the template or anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix('T')?;
        let (month, year) = rest.split_once('-')?;
        if month.len() != 2 {
            return None;
        }
        Self::new(month.parse().ok()?, year.parse().ok()?).ok()
    }

    /// The month as shown to users (`03-2024`)
    pub fn label(&self) -> String {
        format!("{:02}-{}", self.month, self.year)
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{:02}-{}", self.month, self.year)
    }
}

/// A validated `dd-mm-yyyy` date that keeps the text the user typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDate {
    date: NaiveDate,
    text: String,
}

impl ExpenseDate {
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let parts: Vec<&str> = text.split('-').collect();
        let [day, month, year] = parts.as_slice() else {
            return Err(Error::invalid(format!(
                "Expected a date as dd-mm-yyyy, got \"{}\"",
                text
            )));
        };
        let day = parse_number::<u32>(day, "day", text)?;
        let month = parse_number::<u32>(month, "month", text)?;
        let year = parse_year(year, text)?;

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| Error::invalid(format!("\"{}\" is not a calendar date", text)))?;

        Ok(Self {
            date,
            text: text.to_string(),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn partition(&self) -> PartitionKey {
        PartitionKey {
            year: self.date.year(),
            month: self.date.month(),
        }
    }
}

/// Map a `dd-mm-yyyy` date to its partition key
pub fn resolve_partition(date: &str) -> Result<PartitionKey> {
    Ok(ExpenseDate::parse(date)?.partition())
}

fn parse_number<T: std::str::FromStr>(field: &str, what: &str, input: &str) -> Result<T> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid(format!(
            "Invalid {} in \"{}\"",
            what, input
        )));
    }
    field
        .parse()
        .map_err(|_| Error::invalid(format!("Invalid {} in \"{}\"", what, input)))
}

fn parse_year(field: &str, input: &str) -> Result<i32> {
    if field.len() != 4 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid(format!(
            "Year must have four digits in \"{}\"",
            input
        )));
    }
    field
        .parse()
        .map_err(|_| Error::invalid(format!("Invalid year in \"{}\"", input)))
}
