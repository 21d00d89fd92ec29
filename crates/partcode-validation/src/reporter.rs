//! Validation report

use partcode_schema::Side;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of finding. Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Required on IK but no IK slot
    IkMissingSlot,
    /// Required on OK but no OK slot
    OkMissingSlot,
    /// Required on IK but no IK codec
    IkMissingCodec,
    /// Required on OK but no OK codec
    OkMissingCodec,
    MissingDtype,
    /// `dtype=lookup` without a lookup table name
    MissingLookup,
    /// Slot string present but unparsable or narrower than one character
    InvalidSlot,
    /// Required on neither side
    OrphanRow,
    /// Lookup-typed value that is not a code of its table
    UnknownLookupCode,
    /// Lookup table named by the schema but not loaded
    MissingLookupTable,
}

impl IssueCategory {
    pub fn missing_slot(side: Side) -> Self {
        match side {
            Side::Ik => Self::IkMissingSlot,
            Side::Ok => Self::OkMissingSlot,
        }
    }

    pub fn missing_codec(side: Side) -> Self {
        match side {
            Side::Ik => Self::IkMissingCodec,
            Side::Ok => Self::OkMissingCodec,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IkMissingSlot => "ik_missing_slot",
            Self::OkMissingSlot => "ok_missing_slot",
            Self::IkMissingCodec => "ik_missing_codec",
            Self::OkMissingCodec => "ok_missing_codec",
            Self::MissingDtype => "missing_dtype",
            Self::MissingLookup => "missing_lookup",
            Self::InvalidSlot => "invalid_slot",
            Self::OrphanRow => "orphan_row",
            Self::UnknownLookupCode => "unknown_lookup_code",
            Self::MissingLookupTable => "missing_lookup_table",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding about one union schema row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub category: IssueCategory,
    pub pair_id: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        category: IssueCategory,
        pair_id: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            pair_id: pair_id.into(),
            key: key.into(),
            side: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn on_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}/{}: {}", self.category, self.pair_id, self.key, self.message)
    }
}

/// Findings of a validation pass. Never fatal; callers decide what to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Number of rows examined
    pub rows_checked: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.rows_checked += other.rows_checked;
        self.issues.extend(other.issues);
    }

    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues of one category, in report order
    pub fn by_category(&self, category: IssueCategory) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.category == category)
    }

    /// Issue counts per category; categories without issues are absent
    #[must_use]
    pub fn counts_by_category(&self) -> BTreeMap<IssueCategory, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.category).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "{} rows checked, no issues", self.rows_checked);
        }
        writeln!(f, "{} rows checked, {} issues", self.rows_checked, self.len())?;
        for (category, count) in self.counts_by_category() {
            writeln!(f, "  {category}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_category() {
        let mut report = ValidationReport::new();
        report.rows_checked = 3;
        report.push(ValidationIssue::new(IssueCategory::MissingDtype, "V111_2655", "a", "empty dtype"));
        report.push(
            ValidationIssue::new(IssueCategory::OkMissingSlot, "V111_2655", "b", "no slot")
                .on_side(Side::Ok),
        );
        report.push(ValidationIssue::new(IssueCategory::MissingDtype, "V111_2655", "c", "empty dtype"));

        let counts = report.counts_by_category();
        assert_eq!(counts[&IssueCategory::MissingDtype], 2);
        assert_eq!(counts[&IssueCategory::OkMissingSlot], 1);
        assert!(!counts.contains_key(&IssueCategory::OrphanRow));
        assert_eq!(report.by_category(IssueCategory::MissingDtype).count(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_display_lists_categories_in_order() {
        let mut report = ValidationReport::new();
        report.rows_checked = 2;
        report.push(ValidationIssue::new(IssueCategory::OrphanRow, "p", "k", "x"));
        report.push(ValidationIssue::new(IssueCategory::IkMissingSlot, "p", "k", "x"));
        let text = report.to_string();
        let ik = text.find("ik_missing_slot").unwrap();
        let orphan = text.find("orphan_row").unwrap();
        assert!(ik < orphan);
        assert!(text.starts_with("2 rows checked, 2 issues"));
    }

    #[test]
    fn test_issue_serializes_snake_case() {
        let issue = ValidationIssue::new(IssueCategory::InvalidSlot, "p", "k", "bad").on_side(Side::Ik);
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["category"], "invalid_slot");
        assert_eq!(json["side"], "IK");
    }
}
