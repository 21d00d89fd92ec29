//! Column detection for tables whose header names vary between files
//!
//! A [`ColumnDetector`] evaluates an ordered list of [`ColumnMatcher`]s and
//! returns the first column any of them accepts. When nothing matches, the
//! error carries every candidate that was tried.

use crate::table::StringTable;
use regex::Regex;
use thiserror::Error;

/// Header aliases for the IK part-type column of a cross-reference table
pub const IK_PART_TYPE_ALIASES: &[&str] = &[
    "ik_part_type",
    "ik",
    "vcode",
    "익산",
    "익산품명군",
    "v_part_type",
    "V코드",
    "iksan_part_type",
    "ik_pt",
];

/// Header aliases for the OK part-type column of a cross-reference table
pub const OK_PART_TYPE_ALIASES: &[&str] = &[
    "ok_part_type",
    "ok",
    "km",
    "kms",
    "옥천",
    "옥천품명군",
    "km_part_type",
    "KM코드",
    "okcheon_part_type",
    "kmcode",
    "ok_km_code",
    "ok_pt",
];

/// Value shape of IK part-types (`V111`)
pub const IK_VALUE_SHAPE: &str = r"^V\d{3}$";
/// Value shape of OK part-types (4-5 digits)
pub const OK_VALUE_SHAPE: &str = r"^\d{4,5}$";

/// One way of recognizing a column
#[derive(Debug, Clone)]
pub enum ColumnMatcher {
    /// Header equals the alias, ignoring case and surrounding whitespace
    Alias(String),
    /// More than `min_ratio` of the column's values match `pattern`
    ValueShape { pattern: Regex, min_ratio: f64 },
    /// Lowercased header contains every fragment
    HeaderContains(Vec<String>),
    /// Column at a fixed index, the last resort for headerless exports
    Position(usize),
}

impl ColumnMatcher {
    pub fn alias(name: impl Into<String>) -> Self {
        Self::Alias(name.into())
    }

    pub fn header_contains<S: AsRef<str>>(fragments: impl IntoIterator<Item = S>) -> Self {
        Self::HeaderContains(
            fragments
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// Build a value-shape matcher
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn value_shape(pattern: &str, min_ratio: f64) -> Result<Self, regex::Error> {
        Ok(Self::ValueShape {
            pattern: Regex::new(pattern)?,
            min_ratio,
        })
    }

    /// Human-readable form used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Self::Alias(name) => name.clone(),
            Self::ValueShape { pattern, min_ratio } => {
                format!("values matching /{}/ (> {:.0}%)", pattern.as_str(), min_ratio * 100.0)
            }
            Self::HeaderContains(fragments) => format!("header containing {}", fragments.join(" + ")),
            Self::Position(index) => format!("column #{}", index + 1),
        }
    }

    fn find(&self, table: &StringTable) -> Option<usize> {
        match self {
            Self::Alias(name) => {
                let wanted = name.trim().to_lowercase();
                table
                    .headers()
                    .iter()
                    .position(|h| h.trim().to_lowercase() == wanted)
            }
            Self::ValueShape { pattern, min_ratio } => {
                if table.is_empty() {
                    return None;
                }
                (0..table.headers().len()).find(|&column| {
                    let matching = table
                        .column_values(column)
                        .filter(|v| pattern.is_match(v.trim()))
                        .count();
                    matching as f64 / table.len() as f64 > *min_ratio
                })
            }
            Self::HeaderContains(fragments) => table.headers().iter().position(|h| {
                let header = h.to_lowercase();
                fragments.iter().all(|f| header.contains(f.as_str()))
            }),
            Self::Position(index) => (*index < table.headers().len()).then_some(*index),
        }
    }
}

/// No candidate located the requested column
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{table}] could not locate the {role} column; candidates tried: {candidates:?}; present columns: {present:?}")]
pub struct ColumnNotFound {
    pub table: String,
    pub role: String,
    pub candidates: Vec<String>,
    pub present: Vec<String>,
}

/// Ordered list of matchers for one column role
#[derive(Debug, Clone)]
pub struct ColumnDetector {
    role: String,
    matchers: Vec<ColumnMatcher>,
}

impl ColumnDetector {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            matchers: Vec::new(),
        }
    }

    /// Append alias matchers in priority order
    pub fn with_aliases<S: AsRef<str>>(mut self, aliases: impl IntoIterator<Item = S>) -> Self {
        self.matchers
            .extend(aliases.into_iter().map(|a| ColumnMatcher::alias(a.as_ref())));
        self
    }

    /// Append a matcher after the existing ones
    pub fn with_matcher(mut self, matcher: ColumnMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Index of the first column accepted by any matcher, in matcher order
    ///
    /// # Errors
    ///
    /// Returns [`ColumnNotFound`] listing every matcher when none applies.
    pub fn detect(&self, table: &StringTable) -> Result<usize, ColumnNotFound> {
        self.matchers
            .iter()
            .find_map(|matcher| matcher.find(table))
            .ok_or_else(|| ColumnNotFound {
                table: table.name().to_string(),
                role: self.role.clone(),
                candidates: self.matchers.iter().map(ColumnMatcher::describe).collect(),
                present: table.headers().to_vec(),
            })
    }
}
