//! Normalization of hand-maintained identifier and position cells
//!
//! Schema and cross-reference files pass through spreadsheet tools that turn
//! `2655` into `2655.0` and sprinkle full-width spaces, so every join key goes
//! through [`normalize_part_type`] before comparison.

const FULL_WIDTH_SPACE: char = '\u{3000}';

/// Normalize a part-type cell: trim, drop full-width spaces, and remove a
/// trailing `".0"` left by numeric round-tripping.
pub fn normalize_part_type(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| *c != FULL_WIDTH_SPACE).collect();
    let trimmed = cleaned.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed).to_string()
}

/// Coerce a position cell to an integer through float parsing.
///
/// `"5"`, `"5.0"` and `" 5 "` all become `5`; blank or unparsable cells
/// become `0`.
pub fn to_int_like(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => 0,
    }
}

/// Whether a value counts as "not supplied"
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
