//! CSV reader with encoding fallback
//!
//! Every cell is read as a string; nothing is coerced to a number, so codes
//! like `2655` never turn into `2655.0` on the way in.

use crate::config::{CsvConfig, Encoding};
use crate::{CsvError, CsvResult};
use partcode_schema::StringTable;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode `bytes` with one encoding. `None` when the bytes are not valid in
/// that encoding.
pub fn decode_with(bytes: &[u8], encoding: Encoding) -> Option<String> {
    match encoding {
        Encoding::Utf8 => {
            if bytes.starts_with(BOM) {
                return None;
            }
            std::str::from_utf8(bytes).ok().map(str::to_string)
        }
        Encoding::Utf8Bom => {
            let body = bytes.strip_prefix(BOM)?;
            std::str::from_utf8(body).ok().map(str::to_string)
        }
        Encoding::EucKr => encoding_rs::EUC_KR
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned()),
        Encoding::Latin1 => encoding_rs::WINDOWS_1252
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned()),
    }
}

/// Reader for all-string CSV tables
#[derive(Debug, Clone, Default)]
pub struct CsvReader {
    config: CsvConfig,
}

impl CsvReader {
    /// Create a new CSV reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// Read a file into text, trying the configured encodings in order
    pub fn read_text(&self, path: &Path) -> CsvResult<(String, Encoding)> {
        let bytes = fs::read(path)?;
        self.decode(&bytes).ok_or_else(|| CsvError::Encoding {
            path: path.display().to_string(),
            tried: self
                .config
                .encodings
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Decode bytes with the first configured encoding that accepts them
    pub fn decode(&self, bytes: &[u8]) -> Option<(String, Encoding)> {
        self.config.encodings.iter().find_map(|encoding| {
            let decoded = decode_with(bytes, *encoding);
            if decoded.is_none() {
                trace!(%encoding, "Encoding rejected input");
            }
            decoded.map(|text| (text, *encoding))
        })
    }

    /// Read a CSV file into a table named after the file stem
    pub fn read_table(&self, path: &Path) -> CsvResult<StringTable> {
        let (text, encoding) = self.read_text(path)?;
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
        let table = self.parse_table(&name, &text)?;
        debug!(
            path = %path.display(),
            %encoding,
            rows = table.len(),
            columns = table.headers().len(),
            "Read CSV table"
        );
        Ok(table)
    }

    /// Parse CSV text into a table. Short rows are padded with empty cells.
    pub fn parse_table(&self, name: &str, text: &str) -> CsvResult<StringTable> {
        let mut reader = self.config.reader_builder().from_reader(text.as_bytes());
        let headers = reader.headers().map_err(|e| CsvError::from_csv(&e))?.clone();
        let mut table = StringTable::new(name, headers.iter());

        for record in reader.records() {
            let record = record.map_err(|e| CsvError::from_csv(&e))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            table.push_row(record.iter().map(str::to_string).collect());
        }
        Ok(table)
    }
}
