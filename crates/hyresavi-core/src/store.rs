//! Local invoice record store.
//!
//! Records are keyed by `(user_id, invoice_id)`. Callers look up
//! `(user_id, due period)` before storing so that reprocessing the same
//! month is a no-op.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::fields::DuePeriod;
use crate::models::record::InvoiceRecord;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of [`InvoiceStore::put_if_new_period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The record was stored.
    Stored,
    /// A record for the same user and due period already exists.
    DuplicatePeriod(DuePeriod),
}

/// Trait for invoice record storage.
pub trait InvoiceStore {
    /// Get a record by its key.
    fn get(&self, user_id: &str, invoice_id: &str) -> Option<&InvoiceRecord>;

    /// Insert or replace a record.
    fn put(&mut self, record: InvoiceRecord) -> Result<()>;

    /// All records of one user.
    fn records_for_user(&self, user_id: &str) -> Vec<&InvoiceRecord>;

    /// Whether the user already has an invoice due in `period`.
    fn contains_period(&self, user_id: &str, period: DuePeriod) -> bool {
        self.records_for_user(user_id)
            .iter()
            .any(|r| r.period() == Some(period))
    }

    /// Store `record` unless its user already has an invoice for the same
    /// due period. Records without a due period are always stored.
    fn put_if_new_period(&mut self, record: InvoiceRecord) -> Result<PutOutcome> {
        if let Some(period) = record.period() {
            if self.contains_period(&record.user_id, period) {
                info!("Invoice for {} already exists. Skipping.", period);
                return Ok(PutOutcome::DuplicatePeriod(period));
            }
        }
        self.put(record)?;
        Ok(PutOutcome::Stored)
    }
}

/// Store backed by a single JSON file, written through on every `put`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: BTreeMap<(String, String), InvoiceRecord>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let list: Vec<InvoiceRecord> = if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            };
            list.into_iter()
                .map(|r| ((r.user_id.clone(), r.invoice_id.clone()), r))
                .collect()
        } else {
            BTreeMap::new()
        };

        debug!("Opened store {} with {} records", path.display(), records.len());
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let list: Vec<&InvoiceRecord> = self.records.values().collect();
        fs::write(&self.path, serde_json::to_string_pretty(&list)?)?;
        Ok(())
    }
}

impl InvoiceStore for JsonFileStore {
    fn get(&self, user_id: &str, invoice_id: &str) -> Option<&InvoiceRecord> {
        self.records
            .get(&(user_id.to_string(), invoice_id.to_string()))
    }

    /// The in-memory map only keeps the record if the file write succeeds.
    fn put(&mut self, record: InvoiceRecord) -> Result<()> {
        let key = (record.user_id.clone(), record.invoice_id.clone());
        let previous = self.records.insert(key.clone(), record);

        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.records.insert(key, old),
                None => self.records.remove(&key),
            };
            return Err(e);
        }

        debug!("Item added to store {}", self.path.display());
        Ok(())
    }

    fn records_for_user(&self, user_id: &str) -> Vec<&InvoiceRecord> {
        self.records
            .values()
            .filter(|r| r.user_id == user_id)
            .collect()
    }
}
