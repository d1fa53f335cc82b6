//! The flat field mapping produced for every parsed invoice.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved field names.
pub mod keys {
    /// Payment reference code.
    pub const OCR: &str = "OCR";
    /// Due date, `DD-MM-YYYY` when the source date parsed.
    pub const DUE_DATE: &str = "Due Date";
    /// Month of the due date.
    pub const DUE_DATE_MONTH: &str = "due_date_month";
    /// Year of the due date.
    pub const DUE_DATE_YEAR: &str = "due_date_year";
    /// Amount to pay, comma as thousands separator.
    pub const TOTAL_AMOUNT: &str = "Total Amount";
    /// VAT amount.
    pub const MOMS: &str = "Moms";
    /// Source file stem.
    pub const FILENAME: &str = "Filename";

    /// Rent.
    pub const HYRA: &str = "Hyra";
    /// Cold water.
    pub const KALLVATTEN: &str = "Kallvatten";
    /// Hot water.
    pub const VARMVATTEN: &str = "Varmvatten";
    /// Electricity.
    pub const EL: &str = "El";

    /// Keys that never come from the breakdown section.
    pub const RESERVED: [&str; 7] = [
        OCR,
        DUE_DATE,
        DUE_DATE_MONTH,
        DUE_DATE_YEAR,
        TOTAL_AMOUNT,
        MOMS,
        FILENAME,
    ];
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer value (due date month/year).
    Number(i64),
    /// Text value, kept as it appeared after normalization.
    Text(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// Year and month of an invoice's due date.
///
/// This is the grouping key the app uses to decide whether an invoice for a
/// given month has already been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DuePeriod {
    pub year: i32,
    pub month: u32,
}

impl DuePeriod {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for DuePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

/// Field name to value mapping for one invoice.
///
/// Serializes as a flat JSON object, e.g.
/// `{"Due Date": "01-11-2023", "due_date_month": 11, "Hyra": "5,000"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedInvoiceFields {
    fields: BTreeMap<String, FieldValue>,
}

impl ParsedInvoiceFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get a text field.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    /// Get an integer field.
    pub fn number(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(FieldValue::as_i64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn ocr(&self) -> Option<&str> {
        self.text(keys::OCR)
    }

    pub fn due_date(&self) -> Option<&str> {
        self.text(keys::DUE_DATE)
    }

    pub fn total_amount(&self) -> Option<&str> {
        self.text(keys::TOTAL_AMOUNT)
    }

    pub fn moms(&self) -> Option<&str> {
        self.text(keys::MOMS)
    }

    pub fn filename(&self) -> Option<&str> {
        self.text(keys::FILENAME)
    }

    /// Due period, present only when the due date parsed.
    pub fn due_period(&self) -> Option<DuePeriod> {
        let year = self.number(keys::DUE_DATE_YEAR)?;
        let month = self.number(keys::DUE_DATE_MONTH)?;
        Some(DuePeriod::new(
            i32::try_from(year).ok()?,
            u32::try_from(month).ok()?,
        ))
    }

    /// Fields that came from the rent/utility breakdown section.
    pub fn breakdown(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.iter().filter(|(k, _)| !keys::RESERVED.contains(k))
    }
}
