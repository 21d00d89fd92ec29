//! Row-level validation rules
//!
//! Each rule inspects one union schema row and returns its findings.

use crate::lookup::LookupRegistry;
use crate::reporter::{IssueCategory, ValidationIssue};
use partcode_schema::normalize::is_blank;
use partcode_schema::{Side, SlotRange, UnionSchemaRow};

/// A required attribute must have a slot and a codec on that side
pub fn check_required_side(row: &UnionSchemaRow, side: Side) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if !row.required(side) {
        return issues;
    }
    if is_blank(row.slot(side)) {
        issues.push(
            ValidationIssue::new(
                IssueCategory::missing_slot(side),
                &row.pair_id,
                &row.key,
                format!("required on {side} but {} is empty", slot_column(side)),
            )
            .on_side(side),
        );
    }
    if is_blank(row.codec(side)) {
        issues.push(
            ValidationIssue::new(
                IssueCategory::missing_codec(side),
                &row.pair_id,
                &row.key,
                format!("required on {side} but {} is empty", codec_column(side)),
            )
            .on_side(side),
        );
    }
    issues
}

/// A present slot string must parse to a range at least one character wide
pub fn check_slot_syntax(row: &UnionSchemaRow, side: Side) -> Option<ValidationIssue> {
    let slot = row.slot(side);
    match SlotRange::parse(slot) {
        Ok(_) => None,
        Err(error) => Some(
            ValidationIssue::new(
                IssueCategory::InvalidSlot,
                &row.pair_id,
                &row.key,
                format!("{} '{slot}': {error}", slot_column(side)),
            )
            .on_side(side),
        ),
    }
}

pub fn check_dtype(row: &UnionSchemaRow) -> Option<ValidationIssue> {
    is_blank(&row.dtype).then(|| {
        ValidationIssue::new(IssueCategory::MissingDtype, &row.pair_id, &row.key, "dtype is empty")
    })
}

/// `dtype=lookup` needs a lookup table name
pub fn check_lookup_name(row: &UnionSchemaRow) -> Option<ValidationIssue> {
    (row.is_lookup() && is_blank(&row.lookup)).then(|| {
        ValidationIssue::new(
            IssueCategory::MissingLookup,
            &row.pair_id,
            &row.key,
            "dtype is lookup but lookup is empty",
        )
    })
}

/// Every row must be required on at least one side
pub fn check_orphan(row: &UnionSchemaRow) -> Option<ValidationIssue> {
    (!row.required_ik && !row.required_ok).then(|| {
        ValidationIssue::new(
            IssueCategory::OrphanRow,
            &row.pair_id,
            &row.key,
            "required on neither side",
        )
    })
}

/// A lookup-typed value must be a code of its table for the part-type.
///
/// Returns `None` for non-lookup rows, blank values, and tables the registry
/// does not hold unless `require_table` is set.
pub fn check_lookup_code(
    row: &UnionSchemaRow,
    side: Side,
    value: &str,
    registry: &LookupRegistry,
    require_table: bool,
) -> Option<ValidationIssue> {
    if !row.is_lookup() || is_blank(value) || is_blank(&row.lookup) {
        return None;
    }
    let part_type = row.part_type(side);
    match registry.get(&row.lookup) {
        Some(table) if table.contains(side, part_type, value) => None,
        Some(_) => Some(
            ValidationIssue::new(
                IssueCategory::UnknownLookupCode,
                &row.pair_id,
                &row.key,
                format!(
                    "'{}' is not a code of {} for part_type {part_type}",
                    value.trim(),
                    row.lookup
                ),
            )
            .on_side(side),
        ),
        None if require_table => Some(
            ValidationIssue::new(
                IssueCategory::MissingLookupTable,
                &row.pair_id,
                &row.key,
                format!("lookup table {} is not loaded", row.lookup),
            )
            .on_side(side),
        ),
        None => None,
    }
}

fn slot_column(side: Side) -> &'static str {
    match side {
        Side::Ik => "ik_slot",
        Side::Ok => "ok_slot",
    }
}

fn codec_column(side: Side) -> &'static str {
    match side {
        Side::Ik => "ik_codec",
        Side::Ok => "ok_codec",
    }
}
