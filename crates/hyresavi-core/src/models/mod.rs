//! Data models for parsed invoices, stored records, and configuration.

pub mod config;
pub mod fields;
pub mod record;
