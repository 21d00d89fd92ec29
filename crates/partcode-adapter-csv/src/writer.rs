//! CSV writer

use crate::config::CsvConfig;
use crate::{CsvError, CsvResult};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const BOM: &str = "\u{FEFF}";

/// Writer for CSV files
#[derive(Debug, Clone, Default)]
pub struct CsvWriter {
    config: CsvConfig,
}

impl CsvWriter {
    /// Create a new CSV writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }

    /// Write a header row and string records
    pub fn write_records<W: Write>(
        &self,
        mut writer: W,
        headers: &[&str],
        records: &[Vec<String>],
    ) -> CsvResult<()> {
        self.write_bom(&mut writer)?;
        let mut csv_writer = self.config.writer_builder().from_writer(writer);

        csv_writer
            .write_record(headers)
            .map_err(|e| CsvError::write(e.to_string()))?;
        for record in records {
            csv_writer
                .write_record(record)
                .map_err(|e| CsvError::write(e.to_string()))?;
        }

        csv_writer
            .flush()
            .map_err(|e| CsvError::write(e.to_string()))?;
        debug!(record_count = records.len(), "Finished writing CSV");
        Ok(())
    }

    /// Serialize rows; the header comes from the row type's field names
    pub fn write_serialized<W: Write, T: Serialize>(&self, mut writer: W, rows: &[T]) -> CsvResult<()> {
        self.write_bom(&mut writer)?;
        let mut csv_writer = self.config.writer_builder().from_writer(writer);

        for row in rows {
            csv_writer
                .serialize(row)
                .map_err(|e| CsvError::write(e.to_string()))?;
        }

        csv_writer
            .flush()
            .map_err(|e| CsvError::write(e.to_string()))?;
        debug!(record_count = rows.len(), "Finished writing CSV");
        Ok(())
    }

    /// Serialize rows to a file.
    ///
    /// The file is written in full to a sibling temporary path and then
    /// renamed over `path`, so readers never see a half-written artifact.
    pub fn write_file<T: Serialize>(&self, path: &Path, rows: &[T]) -> CsvResult<()> {
        let mut buffer = Vec::new();
        self.write_serialized(&mut buffer, rows)?;
        self.replace_file(path, &buffer)
    }

    /// Replace `path` with already encoded CSV bytes, atomically
    pub fn replace_file(&self, path: &Path, bytes: &[u8]) -> CsvResult<()> {
        let staging = path.with_extension("csv.tmp");
        fs::write(&staging, bytes)?;
        if let Err(error) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(error.into());
        }
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote CSV file");
        Ok(())
    }

    fn write_bom<W: Write>(&self, writer: &mut W) -> CsvResult<()> {
        if self.config.write_bom {
            writer.write_all(BOM.as_bytes())?;
        }
        Ok(())
    }
}
