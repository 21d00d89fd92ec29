//! Lookup table loading
//!
//! A lookup file has `part_type` and `code` columns plus one label column,
//! whatever its header. The table is named after the file stem.

use crate::reader::CsvReader;
use crate::{CsvError, CsvResult};
use partcode_schema::StringTable;
use partcode_validation::{LookupRegistry, LookupTable};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build a lookup table from a loaded CSV table
pub fn lookup_table_from(table: &StringTable) -> CsvResult<LookupTable> {
    let columns = table.require_columns(&["part_type", "code"])?;
    let (part_type, code) = (columns[0], columns[1]);

    // first column that is neither part_type nor code
    let label = (0..table.headers().len()).find(|index| *index != part_type && *index != code);
    let mut lookup = LookupTable::new(table.name());
    if let Some(label) = label {
        lookup = lookup.with_label_column(table.headers()[label].clone());
    }

    for row in 0..table.len() {
        let text = label.map_or("", |column| table.cell(row, column));
        lookup.insert(table.cell(row, part_type), table.cell(row, code), text);
    }
    debug!(table = table.name(), entries = lookup.len(), "Built lookup table");
    Ok(lookup)
}

/// Load one lookup file
pub fn load_lookup_table(reader: &CsvReader, path: &Path) -> CsvResult<LookupTable> {
    let table = reader.read_table(path)?;
    lookup_table_from(&table)
}

/// Load every `*.csv` file of a directory, in file-name order
pub fn load_lookup_dir(reader: &CsvReader, dir: &Path) -> CsvResult<LookupRegistry> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| CsvError::config(format!("cannot read lookup directory {}: {e}", dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    let mut registry = LookupRegistry::new();
    for path in &paths {
        registry.register(load_lookup_table(reader, path)?);
    }
    info!(dir = %dir.display(), tables = registry.len(), "Loaded lookup tables");
    Ok(registry)
}
