//! Union of two per-site schemas over a cross-reference table
//!
//! For every cross-referenced `(ik_part_type, ok_part_type)` pair the unifier
//! collects both sites' rows, coalesces duplicates, and emits one
//! [`UnionSchemaRow`] per attribute key appearing on either side.

use crate::columns::{ColumnDetector, IK_PART_TYPE_ALIASES, OK_PART_TYPE_ALIASES};
use crate::descriptor::{DataType, infer};
use crate::model::{CrossReference, SchemaRow, Side, SlotDefinition, UnionSchema, UnionSchemaRow};
use crate::normalize::{normalize_part_type, to_int_like};
use crate::slot::MAX_POSITION;
use crate::table::StringTable;
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Columns every raw per-site schema table must have
pub const RAW_SCHEMA_COLUMNS: [&str; 5] =
    ["part_type", "pos_from", "pos_to", "attr_name", "lookup_table"];

/// Duplicate rows for one `(part_type, key)` disagree
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "[{side}] part_type={part_type}, key={key} has {} conflicting definitions: {}",
    .definitions.len(),
    .definitions.iter().map(ToString::to_string).collect::<Vec<_>>().join(" | ")
)]
pub struct DefinitionConflict {
    pub side: Side,
    pub part_type: String,
    pub key: String,
    /// Every row found for the key, in input order
    pub definitions: Vec<SlotDefinition>,
}

/// A pair whose part-type has no rows in that site's schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedPair {
    pub pair_id: String,
    pub ik_part_type: String,
    pub ok_part_type: String,
    /// Sides with no schema rows for the pair's part-type
    pub missing: Vec<Side>,
}

impl fmt::Display for UnmappedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sides: Vec<&str> = self.missing.iter().map(|s| s.as_str()).collect();
        write!(
            f,
            "pair {} has no schema rows on {}",
            self.pair_id,
            sides.join(" and ")
        )
    }
}

/// Result of a successful unification
#[derive(Debug, Clone, PartialEq)]
pub struct Unification {
    pub schema: UnionSchema,
    /// Pairs with one or both sides absent from the raw schemas
    pub unmapped: Vec<UnmappedPair>,
    /// Cross-reference rows skipped because a side was blank
    pub skipped_cross_references: usize,
}

/// Unifier configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifierConfig {
    /// Header aliases for the IK column of the cross-reference table
    pub ik_aliases: Vec<String>,
    /// Header aliases for the OK column of the cross-reference table
    pub ok_aliases: Vec<String>,
}

impl Default for UnifierConfig {
    fn default() -> Self {
        Self {
            ik_aliases: IK_PART_TYPE_ALIASES.iter().map(|s| (*s).to_string()).collect(),
            ok_aliases: OK_PART_TYPE_ALIASES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl UnifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the IK aliases
    pub fn ik_aliases<S: Into<String>>(mut self, aliases: impl IntoIterator<Item = S>) -> Self {
        self.ik_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the OK aliases
    pub fn ok_aliases<S: Into<String>>(mut self, aliases: impl IntoIterator<Item = S>) -> Self {
        self.ok_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }
}

/// Rows of one site grouped by part-type, then key
type SiteIndex = BTreeMap<String, BTreeMap<String, Vec<SlotDefinition>>>;

/// Builds the union schema
#[derive(Debug, Clone, Default)]
pub struct SchemaUnifier {
    config: UnifierConfig,
}

impl SchemaUnifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UnifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UnifierConfig {
        &self.config
    }

    /// Merge the IK schema, the OK schema, and the cross-reference table.
    ///
    /// Output rows are sorted by `(ik_part_type, ok_part_type)` then key, so
    /// identical inputs always give identical output.
    ///
    /// # Errors
    ///
    /// Fails on missing columns, an undetectable cross-reference column, or
    /// conflicting duplicate definitions. No partial schema is returned.
    pub fn unify(
        &self,
        ik_schema: &StringTable,
        ok_schema: &StringTable,
        cross_map: &StringTable,
    ) -> Result<Unification> {
        let ik_index = index_site(slim_schema(ik_schema)?);
        let ok_index = index_site(slim_schema(ok_schema)?);
        let (pairs, skipped) = self.slim_pairs(cross_map)?;

        let mut rows = Vec::new();
        let mut unmapped = Vec::new();

        for pair in &pairs {
            let ik_rows = ik_index.get(&pair.ik_part_type);
            let ok_rows = ok_index.get(&pair.ok_part_type);

            let missing: Vec<Side> = [(Side::Ik, ik_rows.is_none()), (Side::Ok, ok_rows.is_none())]
                .into_iter()
                .filter_map(|(side, absent)| absent.then_some(side))
                .collect();
            if !missing.is_empty() {
                let entry = UnmappedPair {
                    pair_id: pair.pair_id(),
                    ik_part_type: pair.ik_part_type.clone(),
                    ok_part_type: pair.ok_part_type.clone(),
                    missing,
                };
                warn!(pair_id = %entry.pair_id, "{entry}");
                unmapped.push(entry);
            }

            let ik_defs = coalesce_part_type(Side::Ik, &pair.ik_part_type, ik_rows)?;
            let ok_defs = coalesce_part_type(Side::Ok, &pair.ok_part_type, ok_rows)?;

            let keys: BTreeSet<&String> = ik_defs.keys().chain(ok_defs.keys()).collect();
            for key in keys {
                rows.push(build_row(pair, key, ik_defs.get(key), ok_defs.get(key)));
            }
            debug!(pair_id = %pair.pair_id(), "Unified pair");
        }

        info!(
            pairs = pairs.len(),
            rows = rows.len(),
            unmapped = unmapped.len(),
            "Built union schema"
        );

        Ok(Unification {
            schema: UnionSchema::new(rows),
            unmapped,
            skipped_cross_references: skipped,
        })
    }

    /// Locate the IK/OK columns of the cross-reference table and return the
    /// distinct, sorted, normalized pairs plus the number of blank rows skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ColumnNotFound`] when either column is missing.
    pub fn slim_pairs(&self, cross_map: &StringTable) -> Result<(BTreeSet<CrossReference>, usize)> {
        let ik_column = ColumnDetector::new("IK part-type")
            .with_aliases(&self.config.ik_aliases)
            .detect(cross_map)?;
        let ok_column = ColumnDetector::new("OK part-type")
            .with_aliases(&self.config.ok_aliases)
            .detect(cross_map)?;

        let mut pairs = BTreeSet::new();
        let mut skipped = 0;
        for (line, row) in cross_map.rows().iter().enumerate() {
            let ik = normalize_part_type(row.get(ik_column).map_or("", String::as_str));
            let ok = normalize_part_type(row.get(ok_column).map_or("", String::as_str));
            if ik.is_empty() || ok.is_empty() {
                warn!(
                    table = cross_map.name(),
                    row = line + 1,
                    "Skipping cross-reference row with a blank part-type"
                );
                skipped += 1;
                continue;
            }
            pairs.insert(CrossReference::new(ik, ok));
        }
        Ok((pairs, skipped))
    }
}

/// Reduce a raw per-site schema table to normalized rows.
///
/// Rows with a blank part-type or attribute name carry no rule and are dropped.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumns`] when a required column is absent
/// and [`crate::Error::PositionOutOfRange`] when a position lies beyond
/// [`MAX_POSITION`] in either direction.
pub fn slim_schema(table: &StringTable) -> Result<Vec<SchemaRow>> {
    let columns = table.require_columns(&RAW_SCHEMA_COLUMNS)?;
    let [part_type, pos_from, pos_to, attr_name, lookup] = [
        columns[0], columns[1], columns[2], columns[3], columns[4],
    ];

    let mut rows = Vec::with_capacity(table.len());
    for index in 0..table.len() {
        let row = SchemaRow {
            part_type: normalize_part_type(table.cell(index, part_type)),
            key: table.cell(index, attr_name).trim().to_string(),
            definition: SlotDefinition::new(
                position(table, index, pos_from)?,
                position(table, index, pos_to)?,
                table.cell(index, lookup).trim(),
            ),
        };
        if row.part_type.is_empty() || row.key.is_empty() {
            debug!(table = table.name(), row = index + 1, "Skipping schema row without part_type or attr_name");
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

fn position(table: &StringTable, index: usize, column: usize) -> Result<i64> {
    let raw = table.cell(index, column);
    let value = to_int_like(raw);
    if usize::try_from(value.unsigned_abs()).is_ok_and(|magnitude| magnitude <= MAX_POSITION) {
        return Ok(value);
    }
    Err(crate::Error::PositionOutOfRange {
        table: table.name().to_string(),
        row: index + 1,
        column: table.headers().get(column).cloned().unwrap_or_default(),
        value: raw.trim().to_string(),
    })
}

fn index_site(rows: Vec<SchemaRow>) -> SiteIndex {
    let mut index = SiteIndex::new();
    for row in rows {
        index
            .entry(row.part_type)
            .or_default()
            .entry(row.key)
            .or_default()
            .push(row.definition);
    }
    index
}

fn coalesce_part_type(
    side: Side,
    part_type: &str,
    rows: Option<&BTreeMap<String, Vec<SlotDefinition>>>,
) -> Result<BTreeMap<String, SlotDefinition>> {
    let mut coalesced = BTreeMap::new();
    for (key, definitions) in rows.into_iter().flatten() {
        coalesced.insert(key.clone(), coalesce(side, part_type, key, definitions)?);
    }
    Ok(coalesced)
}

/// Collapse duplicate definitions of one `(part_type, key)`.
///
/// # Errors
///
/// Returns a [`DefinitionConflict`] listing every definition unless all of
/// them agree on position range and lookup table.
pub fn coalesce(
    side: Side,
    part_type: &str,
    key: &str,
    definitions: &[SlotDefinition],
) -> std::result::Result<SlotDefinition, DefinitionConflict> {
    let conflict = || DefinitionConflict {
        side,
        part_type: part_type.to_string(),
        key: key.to_string(),
        definitions: definitions.to_vec(),
    };
    let first = definitions.first().ok_or_else(conflict)?;
    if definitions.iter().all(|d| d == first) {
        Ok(first.clone())
    } else {
        Err(conflict())
    }
}

fn build_row(
    pair: &CrossReference,
    key: &str,
    ik: Option<&SlotDefinition>,
    ok: Option<&SlotDefinition>,
) -> UnionSchemaRow {
    let ik_inferred = ik.map(infer);
    let ok_inferred = ok.map(infer);

    let lookup_of = |inferred: &Option<(DataType, String, _)>| {
        inferred
            .as_ref()
            .map(|(_, lookup, _)| lookup.clone())
            .unwrap_or_default()
    };
    let ik_lookup = lookup_of(&ik_inferred);
    let ok_lookup = lookup_of(&ok_inferred);
    let lookup = if ik_lookup.is_empty() { ok_lookup } else { ik_lookup };
    let dtype = if lookup.is_empty() {
        DataType::Int
    } else {
        DataType::Lookup
    };

    let codec_of = |inferred: Option<(DataType, String, crate::CodecDescriptor)>| {
        inferred
            .map(|(_, _, codec)| codec.to_string())
            .unwrap_or_default()
    };

    UnionSchemaRow {
        pair_id: pair.pair_id(),
        ik_part_type: pair.ik_part_type.clone(),
        ok_part_type: pair.ok_part_type.clone(),
        key: key.to_string(),
        dtype: dtype.to_string(),
        lookup,
        required_ik: ik.is_some(),
        required_ok: ok.is_some(),
        ik_slot: ik.map(SlotDefinition::slot).unwrap_or_default(),
        ik_codec: codec_of(ik_inferred),
        ok_slot: ok.map(SlotDefinition::slot).unwrap_or_default(),
        ok_codec: codec_of(ok_inferred),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn schema(name: &str, rows: Vec<Vec<&str>>) -> StringTable {
        StringTable::from_rows(name, &RAW_SCHEMA_COLUMNS, rows)
    }

    fn cross_map(rows: Vec<Vec<&str>>) -> StringTable {
        StringTable::from_rows("Cross_Map", &["ik_part_type", "ok_part_type"], rows)
    }

    #[test]
    fn test_scenario_material_code() {
        let ik = schema("IK", vec![vec!["V111", "5", "5", "material_code", "material_lookup"]]);
        let ok = schema("OK", vec![vec!["2655", "5", "6", "material_code", "material_lookup"]]);
        let unified = SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![vec!["V111", "2655"]]))
            .unwrap();

        assert_eq!(unified.schema.len(), 1);
        let row = &unified.schema.rows()[0];
        assert_eq!(row.pair_id, "V111_2655");
        assert_eq!(row.key, "material_code");
        assert!(row.required_ik && row.required_ok);
        assert_eq!(row.ik_slot, "5-5");
        assert_eq!(row.ok_slot, "5-6");
        assert_eq!(row.dtype, "lookup");
        assert_eq!(row.lookup, "material_lookup");
        assert_eq!(row.ik_codec, "lookup:code");
        assert_eq!(row.ok_codec, "lookup:code");
        assert!(unified.unmapped.is_empty());
    }

    #[test]
    fn test_union_of_keys_and_requiredness() {
        let ik = schema(
            "IK",
            vec![
                vec!["V111", "5", "5", "material_code", "material_lookup"],
                vec!["V111", "9", "11", "length_mm", ""],
            ],
        );
        let ok = schema(
            "OK",
            vec![
                vec!["2655", "5", "6", "material_code", "material_lookup"],
                vec!["2655", "7", "7", "surface_code", "surface_lookup"],
            ],
        );
        let unified = SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![vec!["V111", "2655"]]))
            .unwrap();

        let keys = unified.schema.keys("V111_2655");
        assert_eq!(keys, vec!["length_mm", "material_code", "surface_code"]);

        let length = &unified.schema.rows()[0];
        assert!(length.required_ik && !length.required_ok);
        assert_eq!(length.dtype, "int");
        assert_eq!(length.ik_codec, "int:width=3,pad=0");
        assert_eq!(length.ok_slot, "");
        assert_eq!(length.ok_codec, "");

        let surface = &unified.schema.rows()[2];
        assert!(!surface.required_ik && surface.required_ok);
        assert_eq!(surface.ik_slot, "");
        assert_eq!(surface.lookup, "surface_lookup");
    }

    #[test]
    fn test_conflicting_duplicates_fail() {
        let ik = schema(
            "IK",
            vec![
                vec!["V111", "5", "5", "material_code", "material_lookup"],
                vec!["V111", "5", "6", "material_code", "material_lookup"],
            ],
        );
        let ok = schema("OK", vec![vec!["2655", "5", "6", "material_code", ""]]);
        let err = SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![vec!["V111", "2655"]]))
            .unwrap_err();

        match err {
            Error::Conflict(conflict) => {
                assert_eq!(conflict.side, Side::Ik);
                assert_eq!(conflict.part_type, "V111");
                assert_eq!(conflict.key, "material_code");
                assert_eq!(conflict.definitions.len(), 2);
                let message = conflict.to_string();
                assert!(message.contains("pos_to=5"));
                assert!(message.contains("pos_to=6"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_identical_duplicates_coalesce() {
        let ik = schema(
            "IK",
            vec![
                vec!["V111", "5", "5", "material_code", "material_lookup"],
                vec!["V111", "5.0", "5", "material_code", "material_lookup"],
            ],
        );
        let ok = schema("OK", vec![]);
        let unified = SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![vec!["V111", "2655"]]))
            .unwrap();
        assert_eq!(unified.schema.len(), 1);
    }

    #[test]
    fn test_unmapped_pairs_are_reported() {
        let ik = schema("IK", vec![vec!["V111", "5", "5", "material_code", ""]]);
        let ok = schema("OK", vec![]);
        let unified = SchemaUnifier::new()
            .unify(
                &ik,
                &ok,
                &cross_map(vec![vec!["V111", "2655"], vec!["V999", "9999"]]),
            )
            .unwrap();

        assert_eq!(unified.unmapped.len(), 2);
        assert_eq!(unified.unmapped[0].pair_id, "V111_2655");
        assert_eq!(unified.unmapped[0].missing, vec![Side::Ok]);
        assert_eq!(unified.unmapped[1].missing, vec![Side::Ik, Side::Ok]);
        assert!(unified.schema.rows_for("V999_9999").next().is_none());
    }

    #[test]
    fn test_part_types_are_normalized_before_join() {
        let ik = schema("IK", vec![vec![" V111 ", "5", "5", "material_code", ""]]);
        let ok = schema("OK", vec![vec!["2655.0", "5", "6", "material_code", ""]]);
        let unified = SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![vec!["V111", "2655.0"]]))
            .unwrap();
        assert_eq!(unified.schema.rows()[0].pair_id, "V111_2655");
        assert!(unified.schema.rows()[0].required_ok);
    }

    #[test]
    fn test_missing_schema_columns() {
        let ik = StringTable::new("codeSchema_IK", ["part_type", "attr_name"]);
        let ok = schema("OK", vec![]);
        let err = SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![]))
            .unwrap_err();
        assert!(matches!(err, Error::MissingColumns { ref table, .. } if table == "codeSchema_IK"));
    }

    #[test]
    fn test_cross_map_column_not_found() {
        let ik = schema("IK", vec![]);
        let ok = schema("OK", vec![]);
        let pairs = StringTable::new("Cross_Map", ["left", "right"]);
        let err = SchemaUnifier::new().unify(&ik, &ok, &pairs).unwrap_err();
        match err {
            Error::ColumnNotFound(not_found) => {
                assert!(not_found.candidates.contains(&"ik_part_type".to_string()));
                assert_eq!(not_found.present, vec!["left", "right"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cross_map_aliases_and_blank_rows() {
        let ik = schema("IK", vec![vec!["V111", "5", "5", "material_code", ""]]);
        let ok = schema("OK", vec![vec!["2655", "5", "5", "material_code", ""]]);
        let pairs = StringTable::from_rows(
            "Cross_Map",
            &["VCode", "KM_part_type"],
            vec![vec!["V111", "2655"], vec!["V111", ""], vec!["V111", "2655"]],
        );
        let unified = SchemaUnifier::new().unify(&ik, &ok, &pairs).unwrap();
        assert_eq!(unified.schema.len(), 1);
        assert_eq!(unified.skipped_cross_references, 1);
    }

    #[test]
    fn test_output_is_sorted_and_deterministic() {
        let ik = schema(
            "IK",
            vec![
                vec!["V112", "5", "5", "b", ""],
                vec!["V111", "6", "6", "b", ""],
                vec!["V111", "5", "5", "a", ""],
            ],
        );
        let ok = schema("OK", vec![vec!["2700", "5", "5", "a", ""]]);
        let pairs = cross_map(vec![vec!["V112", "2700"], vec!["V111", "2655"]]);

        let first = SchemaUnifier::new().unify(&ik, &ok, &pairs).unwrap();
        let second = SchemaUnifier::new().unify(&ik, &ok, &pairs).unwrap();
        assert_eq!(first, second);

        let order: Vec<(&str, &str)> = first
            .schema
            .rows()
            .iter()
            .map(|r| (r.pair_id.as_str(), r.key.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("V111_2655", "a"),
                ("V111_2655", "b"),
                ("V112_2700", "a"),
                ("V112_2700", "b"),
            ]
        );
    }

    #[test]
    fn test_out_of_range_position_fails() {
        let ik = schema("codeSchema_IK", vec![vec!["V111", "-1", "1e30", "length_mm", ""]]);
        let ok = schema("OK", vec![]);
        let err = SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![vec!["V111", "2655"]]))
            .unwrap_err();
        match err {
            Error::PositionOutOfRange { table, row, column, value } => {
                assert_eq!(table, "codeSchema_IK");
                assert_eq!(row, 1);
                assert_eq!(column, "pos_to");
                assert_eq!(value, "1e30");
            }
            other => panic!("unexpected error: {other}"),
        }

        let ik = schema("IK", vec![vec!["V111", "5", "1e8", "length_mm", ""]]);
        assert!(SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![vec!["V111", "2655"]]))
            .is_err());
    }

    #[test]
    fn test_invalid_width_yields_empty_int_codec() {
        let ik = schema("IK", vec![vec!["V111", "6", "5", "length_mm", ""]]);
        let ok = schema("OK", vec![]);
        let unified = SchemaUnifier::new()
            .unify(&ik, &ok, &cross_map(vec![vec!["V111", "2655"]]))
            .unwrap();
        let row = &unified.schema.rows()[0];
        assert_eq!(row.ik_slot, "6-5");
        assert_eq!(row.ik_codec, "");
        assert_eq!(row.dtype, "int");
    }
}
