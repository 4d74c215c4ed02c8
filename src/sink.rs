use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::record::JobRecord;

/// Destination for newly discovered records.
pub trait RecordSink {
    fn append(&mut self, record: &JobRecord) -> Result<()>;
}

/// Append-only CSV log. The header row is written only when the file does not
/// exist yet; existing files are never rewritten.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_all(&mut self, records: &[JobRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let file_exists = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // The header comes from the first serialized record.
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);
        for record in records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &JobRecord) -> Result<()> {
        self.append_all(std::slice::from_ref(record))
    }
}

impl RecordSink for Vec<JobRecord> {
    fn append(&mut self, record: &JobRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}
