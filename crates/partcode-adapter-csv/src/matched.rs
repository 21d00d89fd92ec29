//! Matched parts: verified IK/OK code pairs
//!
//! A matched-parts file lists full codes that are known to denote the same
//! physical part on both sites. Generated codes are checked against it so the
//! verified counterpart can be reported. Codes are compared without spaces or
//! hyphens and ignoring letter case.

use crate::reader::CsvReader;
use crate::CsvResult;
use partcode_schema::{ColumnDetector, ColumnMatcher, Side, StringTable};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// One verified pair of full codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedPart {
    pub ik_code: String,
    pub ok_code: String,
}

impl MatchedPart {
    pub fn code(&self, side: Side) -> &str {
        match side {
            Side::Ik => &self.ik_code,
            Side::Ok => &self.ok_code,
        }
    }
}

/// Verified code pairs in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedParts {
    parts: Vec<MatchedPart>,
}

impl MatchedParts {
    pub fn new(parts: Vec<MatchedPart>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[MatchedPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Verified code on the other site for `code` of `side`.
    ///
    /// The first matching row wins.
    pub fn counterpart(&self, side: Side, code: &str) -> Option<&str> {
        let wanted = normalize_code(code);
        if wanted.is_empty() {
            return None;
        }
        self.parts
            .iter()
            .find(|part| normalize_code(part.code(side)) == wanted)
            .map(|part| part.code(side.other()))
    }
}

/// Comparison form of a code: no whitespace, no hyphens, upper case
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Load a matched-parts file
pub fn load_matched_parts(reader: &CsvReader, path: &Path) -> CsvResult<MatchedParts> {
    let table = reader.read_table(path)?;
    matched_parts_from(&table)
}

/// Find the code columns and collect the complete pairs.
///
/// The IK column is the first header containing `ik` and `code`, else the
/// first column. The OK column is the first header containing `ok` and
/// `code`, else one containing `km`, else the second column. Rows missing
/// either code are dropped.
pub fn matched_parts_from(table: &StringTable) -> CsvResult<MatchedParts> {
    let ik_column = ColumnDetector::new("IK code")
        .with_matcher(ColumnMatcher::header_contains(["ik", "code"]))
        .with_matcher(ColumnMatcher::Position(0))
        .detect(table)
        .map_err(partcode_schema::Error::from)?;
    let ok_column = ColumnDetector::new("OK code")
        .with_matcher(ColumnMatcher::header_contains(["ok", "code"]))
        .with_matcher(ColumnMatcher::header_contains(["km"]))
        .with_matcher(ColumnMatcher::Position(1))
        .detect(table)
        .map_err(partcode_schema::Error::from)?;

    let parts: Vec<MatchedPart> = (0..table.len())
        .map(|row| MatchedPart {
            ik_code: table.cell(row, ik_column).trim().to_string(),
            ok_code: table.cell(row, ok_column).trim().to_string(),
        })
        .filter(|part| !part.ik_code.is_empty() && !part.ok_code.is_empty())
        .collect();
    debug!(table = table.name(), pairs = parts.len(), "Loaded matched parts");
    Ok(MatchedParts::new(parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: Vec<Vec<&str>>) -> StringTable {
        StringTable::from_rows("matched_parts", headers, rows)
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" v111-7z 07 "), "V1117Z07");
        assert_eq!(normalize_code("2655\u{3000}7"), "26557");
        assert_eq!(normalize_code(" - "), "");
    }

    #[test]
    fn test_counterpart_ignores_spacing_and_case() {
        let parts = matched_parts_from(&table(
            &["No", "IK_Code", "KM Code"],
            vec![
                vec!["1", "V111-7Z07", "2655-7A"],
                vec!["2", "V1117Z07", "2655-7B"],
                vec!["3", "V1128", ""],
            ],
        ))
        .unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts.counterpart(Side::Ik, "v1117z07"), Some("2655-7A"));
        assert_eq!(parts.counterpart(Side::Ok, "2655 7b"), Some("V1117Z07"));
        assert_eq!(parts.counterpart(Side::Ik, "V1128"), None);
        assert_eq!(parts.counterpart(Side::Ik, ""), None);
    }

    #[test]
    fn test_positional_fallback() {
        let parts = matched_parts_from(&table(&["a", "b"], vec![vec!["V1117", "26557?"]])).unwrap();
        assert_eq!(parts.parts()[0].code(Side::Ok), "26557?");
    }

    #[test]
    fn test_single_column_has_no_ok_code() {
        let err = matched_parts_from(&table(&["codes"], vec![vec!["V1117"]])).unwrap_err();
        assert!(err.to_string().contains("OK code"), "{err}");
    }
}
