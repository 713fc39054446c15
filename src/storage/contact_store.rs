use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use thiserror::Error;

use super::models::{ContactRecord, NO_REFERRER};

/// Column order of the durable store.
pub const CSV_HEADER: [&str; 7] = [
    "Name",
    "Phone",
    "Username",
    "Chat ID",
    "Day",
    "Time",
    "Referrer ID",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("contact store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("contact store csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// CSV-backed contact store with an in-memory read cache.
///
/// The file is append-only; every append updates the file first and the
/// cache second, so readers of the cache never observe a record the file
/// does not hold.
pub struct ContactStore {
    path: PathBuf,
    records: Vec<ContactRecord>,
}

impl ContactStore {
    /// Open the store, creating the file with its header row when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut writer = WriterBuilder::new().from_path(&path)?;
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
        }
        let records = Self::load(&path)?;
        Ok(Self { path, records })
    }

    fn load(path: &Path) -> Result<Vec<ContactRecord>, StoreError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let cell = |index: usize| row.get(index).unwrap_or_default().to_string();
            let referrer = row
                .get(6)
                .map(str::trim)
                .filter(|cell| !cell.is_empty() && *cell != NO_REFERRER)
                .map(str::to_string);
            records.push(ContactRecord {
                name: cell(0),
                phone: cell(1),
                username: cell(2),
                chat_id: cell(3),
                day: cell(4),
                time: cell(5),
                referrer,
            });
        }
        Ok(records)
    }

    /// Whether a record for this chat identity already exists.
    pub fn exists(&self, chat_id: &str) -> bool {
        self.records.iter().any(|record| record.chat_id == chat_id)
    }

    /// Append a record to the file, then to the cache.
    pub fn append(&mut self, record: ContactRecord) -> Result<(), StoreError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().from_writer(file);
        writer.write_record([
            record.name.as_str(),
            record.phone.as_str(),
            record.username.as_str(),
            record.chat_id.as_str(),
            record.day.as_str(),
            record.time.as_str(),
            record.referrer_cell(),
        ])?;
        writer.flush()?;
        self.records.push(record);
        Ok(())
    }

    pub fn all(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
