//! Persisted invoice records.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::fields::{DuePeriod, ParsedInvoiceFields};

/// Prefix used for invoice identifiers derived from file names.
pub const DEFAULT_INVOICE_ID_PREFIX: &str = "Invoice_";

/// A parsed invoice with the identity the caller attaches to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Owner of the invoice.
    #[serde(rename = "UserID")]
    pub user_id: String,

    /// Invoice identifier, unique per user.
    #[serde(rename = "InvoiceID")]
    pub invoice_id: String,

    /// Parsed fields, flattened next to the identity.
    #[serde(flatten)]
    pub fields: ParsedInvoiceFields,
}

impl InvoiceRecord {
    pub fn new(
        user_id: impl Into<String>,
        invoice_id: impl Into<String>,
        fields: ParsedInvoiceFields,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            invoice_id: invoice_id.into(),
            fields,
        }
    }

    /// Due period of this invoice, if its due date parsed.
    pub fn period(&self) -> Option<DuePeriod> {
        self.fields.due_period()
    }
}

/// Derive an invoice identifier from a source file name.
///
/// The vendor names attachments `Hyresavi_<number>.pdf`; the identifier is
/// `prefix` followed by the last `_`-separated segment of the file stem.
pub fn invoice_id_for(path: &Path, prefix: &str) -> String {
    let stem = file_stem(path);
    let suffix = stem.rsplit('_').next().unwrap_or(stem);
    format!("{}{}", prefix, suffix)
}

/// Base name of a file with everything from the first `.` stripped.
pub fn file_stem(path: &Path) -> &str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.split('.').next().unwrap_or(name)
}
