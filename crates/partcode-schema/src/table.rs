//! All-string tables
//!
//! Every input table is kept as text. Codes such as `2655` stay `"2655"` and
//! never pass through a numeric type.

use crate::{Error, Result};

/// A named table of string cells with a header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StringTable {
    /// Create an empty table with the given headers
    pub fn new<H: Into<String>>(name: impl Into<String>, headers: impl IntoIterator<Item = H>) -> Self {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(|h| h.into().trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from headers and rows in one step
    pub fn from_rows<R, C>(name: impl Into<String>, headers: &[&str], rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let mut table = Self::new(name, headers.iter().copied());
        for row in rows {
            table.push_row(row.into_iter().map(Into::into).collect());
        }
        table
    }

    /// Append a row, padding short rows with empty cells and dropping cells
    /// past the header width
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value, empty when out of range
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }

    /// All values of one column
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |r| r.get(column).map_or("", String::as_str))
    }

    /// Resolve every named column, failing with all missing names at once
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| (*name).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns {
                table: self.name.clone(),
                missing,
                present: self.headers.clone(),
            });
        }
        Ok(names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_padded_to_header_width() {
        let table = StringTable::from_rows("t", &["a", "b", "c"], vec![vec!["1"], vec!["1", "2", "3", "4"]]);
        assert_eq!(table.rows()[0], vec!["1", "", ""]);
        assert_eq!(table.rows()[1], vec!["1", "2", "3"]);
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(9, 0), "");
    }

    #[test]
    fn test_headers_are_trimmed() {
        let table = StringTable::new("t", [" part_type ", "pos_from"]);
        assert_eq!(table.column_index("part_type"), Some(0));
    }

    #[test]
    fn test_require_columns_reports_all_missing() {
        let table = StringTable::new("codeSchema_IK", ["part_type", "attr_name"]);
        let err = table
            .require_columns(&["part_type", "pos_from", "pos_to"])
            .unwrap_err();
        match err {
            Error::MissingColumns {
                table,
                missing,
                present,
            } => {
                assert_eq!(table, "codeSchema_IK");
                assert_eq!(missing, vec!["pos_from", "pos_to"]);
                assert_eq!(present, vec!["part_type", "attr_name"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
