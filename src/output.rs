// src/output.rs

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use csv::WriterBuilder;
use tracing::{debug, info};

use crate::{error::ScrapeError, process::ConditionEntry};

/// Output header, in the column order `ConditionEntry` serializes to.
pub const HEADER: [&str; 4] = ["Week ending", "State", "Condition", "Percent"];

/// Second precision, no colons so the name is valid everywhere.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H%M%S";

/// Append-only CSV table created once per run.
#[derive(Debug)]
pub struct OutputTable {
    path: PathBuf,
    rows: usize,
}

impl OutputTable {
    /// Create `<dir>/<base_name>_<timestamp>.csv` holding just the header.
    pub fn create(
        dir: impl AsRef<Path>,
        base_name: &str,
        now: NaiveDateTime,
    ) -> Result<Self, ScrapeError> {
        let dir = dir.as_ref();
        let path = dir.join(format!("{}_{}.csv", base_name, now.format(TIMESTAMP_FORMAT)));

        fs::create_dir_all(dir).map_err(|e| ScrapeError::write(dir)(e.into()))?;
        let mut wtr = WriterBuilder::new()
            .from_path(&path)
            .map_err(ScrapeError::write(&path))?;
        wtr.write_record(HEADER).map_err(ScrapeError::write(&path))?;
        wtr.flush().map_err(|e| ScrapeError::write(&path)(e.into()))?;

        info!(path = %path.display(), "created output table");
        Ok(Self { path, rows: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended through this handle so far, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Append `entries` in header order. Returns how many rows were written.
    ///
    /// The batch is serialized in memory and written with a single
    /// `write_all`, so a serialization error leaves the file untouched.
    pub fn append(&mut self, entries: &[ConditionEntry]) -> Result<usize, ScrapeError> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        for entry in entries {
            wtr.serialize(entry).map_err(ScrapeError::write(&self.path))?;
        }
        let batch = wtr
            .into_inner()
            .map_err(|e| ScrapeError::write(&self.path)(e.into_error().into()))?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| ScrapeError::write(&self.path)(e.into()))?;
        file.write_all(&batch)
            .and_then(|_| file.flush())
            .map_err(|e| ScrapeError::write(&self.path)(e.into()))?;

        self.rows += entries.len();
        debug!(path = %self.path.display(), appended = entries.len(), total = self.rows, "appended rows");
        Ok(entries.len())
    }
}
