//! Regex patterns for the rental invoice template.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Payment reference: "1297534008 #"
    pub static ref OCR_REFERENCE: Regex = Regex::new(
        r"(\d{10}) #"
    ).unwrap();

    // Due date label followed by an ISO date, or else the rest of the line
    pub static ref DUE_DATE: Regex = Regex::new(
        r"Förfallodatum:[ \t]*(?:(\d{4}-\d{2}-\d{2})|([^\r\n]*))"
    ).unwrap();

    // Total amount, either on the label line or after up to one blank line
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"Totalt att betala:[ \t]*(?:\r?\n[ \t]*){0,2}(\d[\d \u{00a0}]*)"
    ).unwrap();

    // Decoration the template puts around labels and values
    pub static ref NOISE: Regex = Regex::new(
        r"[*()]"
    ).unwrap();
}

/// Remove `*`, `(` and `)` and surrounding whitespace.
pub fn strip_noise(s: &str) -> String {
    NOISE.replace_all(s, "").trim().to_string()
}
