//! Part catalog and cross-reference loaders
//!
//! Cross-reference files come from several tools with different headers.
//! Columns are found by alias first and by value shape second
//! (`V111`-like values for IK, 4-5 digit values for OK).

use crate::reader::CsvReader;
use crate::CsvResult;
use partcode_schema::columns::{IK_VALUE_SHAPE, OK_VALUE_SHAPE};
use partcode_schema::normalize::normalize_part_type;
use partcode_schema::{ColumnDetector, ColumnMatcher, StringTable, UnifierConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Share of rows whose value must match a value shape
pub const VALUE_SHAPE_MIN_RATIO: f64 = 0.5;

/// Header names of the normalized cross-reference table
pub const CROSS_MAP_COLUMNS: [&str; 2] = ["ik_part_type", "ok_part_type"];

/// One part catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    pub part_type: String,
    pub category: String,
    pub remark: String,
    /// Remaining columns by header
    pub extra: BTreeMap<String, String>,
}

/// Load the part catalog. Only `part_type` is required.
pub fn load_catalog(reader: &CsvReader, path: &Path) -> CsvResult<Vec<CatalogRow>> {
    let table = reader.read_table(path)?;
    catalog_from(&table)
}

pub fn catalog_from(table: &StringTable) -> CsvResult<Vec<CatalogRow>> {
    let part_type = table.require_columns(&["part_type"])?[0];
    let category = table.column_index("category");
    let remark = table.column_index("remark");
    let cell = |row: usize, column: Option<usize>| column.map_or_else(String::new, |c| table.cell(row, c).to_string());

    let rows = (0..table.len())
        .map(|row| CatalogRow {
            part_type: normalize_part_type(table.cell(row, part_type)),
            category: cell(row, category),
            remark: cell(row, remark),
            extra: table
                .headers()
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != category && Some(*index) != remark && *index != part_type)
                .map(|(index, header)| (header.clone(), table.cell(row, index).to_string()))
                .collect(),
        })
        .filter(|entry| !entry.part_type.is_empty())
        .collect();
    Ok(rows)
}

/// IK/OK part-type pairs keyed both ways
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossMap {
    pub ik_to_ok: BTreeMap<String, String>,
    pub ok_to_ik: BTreeMap<String, String>,
    /// Two-column table with [`CROSS_MAP_COLUMNS`] headers, ready for the
    /// unifier
    pub table: StringTable,
}

/// Load a cross-reference file whose headers may be anything
pub fn load_cross_map(reader: &CsvReader, path: &Path, config: &UnifierConfig) -> CsvResult<CrossMap> {
    let table = reader.read_table(path)?;
    cross_map_from(&table, config)
}

/// Locate the IK and OK columns (alias, then value shape) and normalize the
/// pairs. When a part-type appears in several rows, the last row wins in the
/// lookup maps. The table keeps every row, blank ones included, so the
/// unifier can count what it skips.
pub fn cross_map_from(table: &StringTable, config: &UnifierConfig) -> CsvResult<CrossMap> {
    let ik_column = detector("IK part-type", &config.ik_aliases, IK_VALUE_SHAPE)
        .detect(table)
        .map_err(partcode_schema::Error::from)?;
    let ok_column = detector("OK part-type", &config.ok_aliases, OK_VALUE_SHAPE)
        .detect(table)
        .map_err(partcode_schema::Error::from)?;
    debug!(
        table = table.name(),
        ik = %table.headers()[ik_column],
        ok = %table.headers()[ok_column],
        "Detected cross-reference columns"
    );

    let mut map = CrossMap {
        table: StringTable::new(table.name(), CROSS_MAP_COLUMNS),
        ..CrossMap::default()
    };
    for row in 0..table.len() {
        let ik = normalize_part_type(table.cell(row, ik_column));
        let ok = normalize_part_type(table.cell(row, ok_column));
        if !ik.is_empty() && !ok.is_empty() {
            map.ik_to_ok.insert(ik.clone(), ok.clone());
            map.ok_to_ik.insert(ok.clone(), ik.clone());
        }
        map.table.push_row(vec![ik, ok]);
    }
    Ok(map)
}

fn detector(role: &str, aliases: &[String], shape: &str) -> ColumnDetector {
    let detector = ColumnDetector::new(role).with_aliases(aliases);
    match ColumnMatcher::value_shape(shape, VALUE_SHAPE_MIN_RATIO) {
        Ok(matcher) => detector.with_matcher(matcher),
        Err(error) => {
            warn!(role, %error, "Value shape pattern rejected; detecting by alias only");
            detector
        }
    }
}
