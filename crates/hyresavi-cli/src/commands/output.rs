//! Output formats for parsed invoice records.

use std::fmt::Write as _;

use hyresavi_core::{keys, InvoiceRecord};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for outputs written in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["UserID".to_string(), "InvoiceID".to_string()];
    let mut row = vec![record.user_id.clone(), record.invoice_id.clone()];
    for (key, value) in record.fields.iter() {
        header.push(key.to_string());
        row.push(value.to_string());
    }

    wtr.write_record(&header)?;
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let fields = &record.fields;
    let mut output = String::new();

    let _ = writeln!(output, "Invoice: {}", record.invoice_id);
    let _ = writeln!(output, "User: {}", record.user_id);
    if let Some(filename) = fields.filename() {
        let _ = writeln!(output, "File: {}", filename);
    }
    output.push('\n');

    if let Some(due_date) = fields.due_date() {
        let _ = writeln!(output, "Due date: {}", due_date);
    }
    if let Some(ocr) = fields.ocr() {
        let _ = writeln!(output, "OCR: {}", ocr);
    }
    if let Some(total) = fields.total_amount() {
        let _ = writeln!(output, "Total: {} kr", total);
    }
    if let Some(moms) = fields.moms() {
        let _ = writeln!(output, "VAT: {} kr", moms);
    }

    let breakdown: Vec<_> = fields.breakdown().collect();
    if !breakdown.is_empty() {
        output.push_str("\nBreakdown:\n");
        for (label, value) in breakdown {
            let marker = if label == keys::HYRA { "*" } else { " " };
            let _ = writeln!(output, " {}{:<24} {:>10}", marker, label, value.to_string());
        }
    }

    output
}
