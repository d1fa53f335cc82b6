//! Due date extraction.

use chrono::{Datelike, NaiveDate};

use super::patterns::DUE_DATE;
use super::FieldExtractor;
use crate::models::fields::{keys, ParsedInvoiceFields};

/// Due date as found after the "Förfallodatum:" label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueDate {
    /// The text was a valid `YYYY-MM-DD` date.
    Parsed(NaiveDate),
    /// The text could not be read as a date and is kept verbatim.
    Raw(String),
}

impl DueDate {
    /// Write this date into `fields`.
    ///
    /// A parsed date yields `Due Date` as `DD-MM-YYYY` plus
    /// `due_date_month` and `due_date_year`; raw text yields `Due Date` only.
    pub fn apply_to(&self, fields: &mut ParsedInvoiceFields) {
        match self {
            Self::Parsed(date) => {
                fields.insert(keys::DUE_DATE, date.format("%d-%m-%Y").to_string());
                fields.insert(keys::DUE_DATE_MONTH, i64::from(date.month()));
                fields.insert(keys::DUE_DATE_YEAR, i64::from(date.year()));
            }
            Self::Raw(text) => {
                fields.insert(keys::DUE_DATE, text.as_str());
            }
        }
    }
}

/// Read `YYYY-MM-DD`, falling back to the raw text.
pub fn convert_due_date(text: &str) -> DueDate {
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => DueDate::Parsed(date),
        Err(_) => DueDate::Raw(text.to_string()),
    }
}

/// Extracts the labeled due date.
#[derive(Debug, Default)]
pub struct DueDateExtractor;

impl DueDateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for DueDateExtractor {
    type Output = DueDate;

    /// An ISO date right after the label wins, even with punctuation stuck
    /// to it. Otherwise the rest of the label line is kept; a label with
    /// nothing after it is skipped.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        DUE_DATE.captures_iter(text).find_map(|caps| {
            if let Some(date) = caps.get(1) {
                return Some(convert_due_date(date.as_str()));
            }
            let rest = caps.get(2)?.as_str().trim();
            (!rest.is_empty()).then(|| convert_due_date(rest))
        })
    }
}
