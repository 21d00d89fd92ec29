//! # partcode-adapter-csv
//!
//! CSV adapter for the part code tables.
//!
//! Reads raw per-site schemas, cross-reference files, lookup tables, matched
//! parts and the part catalog as all-string tables, trying UTF-8, UTF-8 with
//! BOM, EUC-KR (CP949) and Latin-1 in turn. Writes the union schema artifact
//! as UTF-8 with a byte order mark so spreadsheet tools keep Korean labels
//! intact.
//!
//! ## Example Usage
//!
//! ```rust
//! use partcode_adapter_csv::{CsvAdapter, CsvConfig, RecordTerminator};
//!
//! let adapter = CsvAdapter::new()
//!     .with_config(CsvConfig::new().record_terminator(RecordTerminator::LF));
//!
//! let table = adapter
//!     .reader()
//!     .parse_table("codeSchema_IK", "part_type,pos_from,pos_to,attr_name,lookup_table\nV111,5,5,material_code,material_lookup\n")
//!     .unwrap();
//! assert_eq!(table.cell(0, 3), "material_code");
//! ```

pub mod catalog;
pub mod config;
pub mod errors;
pub mod lookup;
pub mod matched;
pub mod reader;
pub mod union;
pub mod writer;

// Re-export main types
pub use catalog::{CatalogRow, CrossMap, load_catalog, load_cross_map};
pub use config::{CsvConfig, Encoding, RecordTerminator};
pub use errors::{CsvError, CsvResult};
pub use lookup::{load_lookup_dir, load_lookup_table};
pub use matched::{MatchedPart, MatchedParts, load_matched_parts};
pub use reader::CsvReader;
pub use union::{parse_union_schema, read_union_schema, union_schema_bytes, write_union_schema};
pub use writer::CsvWriter;

pub use errors::CsvError as Error;
pub type Result<T> = CsvResult<T>;

use partcode_schema::{StringTable, UnifierConfig, UnionSchema};
use partcode_validation::LookupRegistry;
use std::path::Path;

/// CSV adapter that combines reader and writer functionality
#[derive(Debug, Clone, Default)]
pub struct CsvAdapter {
    config: CsvConfig,
}

impl CsvAdapter {
    /// Create a new CSV adapter with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create adapter with configuration
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// Get a reader configured with this adapter's settings
    pub fn reader(&self) -> CsvReader {
        CsvReader::new().with_config(self.config.clone())
    }

    /// Get a writer configured with this adapter's settings
    pub fn writer(&self) -> CsvWriter {
        CsvWriter::new().with_config(self.config.clone())
    }

    /// Read any table as strings
    pub fn read_table(&self, path: &Path) -> Result<StringTable> {
        self.reader().read_table(path)
    }

    /// Read a cross-reference file and return its normalized two-column table
    pub fn read_cross_map(&self, path: &Path, config: &UnifierConfig) -> Result<StringTable> {
        Ok(load_cross_map(&self.reader(), path, config)?.table)
    }

    pub fn read_union_schema(&self, path: &Path) -> Result<UnionSchema> {
        read_union_schema(&self.reader(), path)
    }

    pub fn write_union_schema(&self, path: &Path, schema: &UnionSchema) -> Result<()> {
        write_union_schema(&self.writer(), path, schema)
    }

    pub fn load_lookup_dir(&self, dir: &Path) -> Result<LookupRegistry> {
        load_lookup_dir(&self.reader(), dir)
    }
}
