use chrono::NaiveDateTime;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::DonorRecord;

/// Column headers of the donor file
pub const CSV_HEADER: [&str; 10] = [
    "Date Recorded",
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Address",
    "Donation Type",
    "Merchandise Items",
    "Donation Date",
    "Location",
];

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only CSV store of donor submissions
///
/// Every append opens the file, writes one row and closes it again. There is
/// no locking; concurrent appends rely on the file system's append semantics.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create the file with its header row if it does not exist yet
    pub fn init(&self) -> Result<(), RecordError> {
        if self.exists() {
            return Ok(());
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        tracing::info!("Created donor file {}", self.path.display());
        Ok(())
    }

    /// Append one submission recorded at `recorded_at`
    pub fn append(&self, donor: &DonorRecord, recorded_at: NaiveDateTime) -> Result<(), RecordError> {
        let needs_header = !self.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(CSV_HEADER)?;
        }

        let recorded = recorded_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let merchandise = merchandise_column(&donor.merchandise_items);
        writer.write_record([
            recorded.as_str(),
            donor.first_name.as_str(),
            donor.last_name.as_str(),
            donor.email.as_str(),
            donor.phone.as_str(),
            donor.address.as_str(),
            donor.donation_type.as_str(),
            merchandise.as_str(),
            donor.donation_date.as_str(),
            donor.location.as_str(),
        ])?;
        writer.flush()?;

        Ok(())
    }
}

fn merchandise_column(items: &[String]) -> String {
    if items.is_empty() {
        "N/A".to_string()
    } else {
        items.join(", ")
    }
}
