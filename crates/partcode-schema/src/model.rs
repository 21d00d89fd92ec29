//! Schema model definitions

use crate::descriptor::CodecDescriptor;
use crate::slot::SlotRange;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Attribute values keyed by attribute name. Values are opaque strings.
pub type Attributes = BTreeMap<String, String>;

/// One of the two participating manufacturing sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "IK")]
    Ik,
    #[serde(rename = "OK")]
    Ok,
}

impl Side {
    /// Both sides, IK first
    pub const ALL: [Side; 2] = [Side::Ik, Side::Ok];

    /// The opposite site
    pub fn other(self) -> Self {
        match self {
            Self::Ik => Self::Ok,
            Self::Ok => Self::Ik,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ik => "IK",
            Self::Ok => "OK",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "IK" | "IKSAN" | "익산" => Ok(Self::Ik),
            "OK" | "OKCHEON" | "옥천" => Ok(Self::Ok),
            _ => Err(Error::InvalidSide(s.to_string())),
        }
    }
}

/// Position range and lookup table of one attribute on one site
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotDefinition {
    pub pos_from: i64,
    pub pos_to: i64,
    /// Lookup table name, empty for free-form numeric attributes
    pub lookup: String,
}

impl SlotDefinition {
    pub fn new(pos_from: i64, pos_to: i64, lookup: impl Into<String>) -> Self {
        Self {
            pos_from,
            pos_to,
            lookup: lookup.into(),
        }
    }

    /// Slot width, which may be zero or negative for malformed ranges
    pub fn width(&self) -> i64 {
        self.pos_to.saturating_sub(self.pos_from).saturating_add(1)
    }

    /// Slot string as stored in the union schema (`"5-6"`)
    pub fn slot(&self) -> String {
        format!("{}-{}", self.pos_from, self.pos_to)
    }
}

impl fmt::Display for SlotDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pos_from={}, pos_to={}, lookup={}",
            self.pos_from,
            self.pos_to,
            if self.lookup.is_empty() {
                "-"
            } else {
                self.lookup.as_str()
            }
        )
    }
}

/// A normalized row of a raw per-site schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRow {
    pub part_type: String,
    pub key: String,
    pub definition: SlotDefinition,
}

/// A cross-reference entry declaring that two part-types are the same family
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrossReference {
    pub ik_part_type: String,
    pub ok_part_type: String,
}

impl CrossReference {
    pub fn new(ik_part_type: impl Into<String>, ok_part_type: impl Into<String>) -> Self {
        Self {
            ik_part_type: ik_part_type.into(),
            ok_part_type: ok_part_type.into(),
        }
    }

    pub fn pair_id(&self) -> String {
        format!("{}_{}", self.ik_part_type, self.ok_part_type)
    }

    pub fn part_type(&self, side: Side) -> &str {
        match side {
            Side::Ik => &self.ik_part_type,
            Side::Ok => &self.ok_part_type,
        }
    }
}

/// One row of the union schema artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionSchemaRow {
    pub pair_id: String,
    pub ik_part_type: String,
    pub ok_part_type: String,
    pub key: String,
    #[serde(default)]
    pub dtype: String,
    #[serde(default)]
    pub lookup: String,
    #[serde(with = "flag", default)]
    pub required_ik: bool,
    #[serde(with = "flag", default)]
    pub required_ok: bool,
    #[serde(default)]
    pub ik_slot: String,
    #[serde(default)]
    pub ik_codec: String,
    #[serde(default)]
    pub ok_slot: String,
    #[serde(default)]
    pub ok_codec: String,
}

impl UnionSchemaRow {
    /// Column order of the persisted artifact
    pub const COLUMNS: [&'static str; 12] = [
        "pair_id",
        "ik_part_type",
        "ok_part_type",
        "key",
        "dtype",
        "lookup",
        "required_ik",
        "required_ok",
        "ik_slot",
        "ik_codec",
        "ok_slot",
        "ok_codec",
    ];

    pub fn required(&self, side: Side) -> bool {
        match side {
            Side::Ik => self.required_ik,
            Side::Ok => self.required_ok,
        }
    }

    pub fn part_type(&self, side: Side) -> &str {
        match side {
            Side::Ik => &self.ik_part_type,
            Side::Ok => &self.ok_part_type,
        }
    }

    pub fn slot(&self, side: Side) -> &str {
        match side {
            Side::Ik => &self.ik_slot,
            Side::Ok => &self.ok_slot,
        }
    }

    pub fn codec(&self, side: Side) -> &str {
        match side {
            Side::Ik => &self.ik_codec,
            Side::Ok => &self.ok_codec,
        }
    }

    /// Parsed slot range on `side`; `Ok(None)` when the slot is empty
    pub fn slot_range(&self, side: Side) -> Result<Option<SlotRange>> {
        SlotRange::parse(self.slot(side))
    }

    pub fn codec_descriptor(&self, side: Side) -> CodecDescriptor {
        CodecDescriptor::parse(self.codec(side))
    }

    pub fn is_lookup(&self) -> bool {
        self.dtype.trim() == "lookup"
    }
}

/// Identity of a cross-referenced pair inside the union schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairInfo {
    pub pair_id: String,
    pub ik_part_type: String,
    pub ok_part_type: String,
}

impl PairInfo {
    pub fn part_type(&self, side: Side) -> &str {
        match side {
            Side::Ik => &self.ik_part_type,
            Side::Ok => &self.ok_part_type,
        }
    }
}

impl From<&UnionSchemaRow> for PairInfo {
    fn from(row: &UnionSchemaRow) -> Self {
        Self {
            pair_id: row.pair_id.clone(),
            ik_part_type: row.ik_part_type.clone(),
            ok_part_type: row.ok_part_type.clone(),
        }
    }
}

/// The merged, pair-indexed schema. Immutable once built or loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnionSchema {
    rows: Vec<UnionSchemaRow>,
}

impl UnionSchema {
    /// Wrap rows in the order given
    pub fn new(rows: Vec<UnionSchemaRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[UnionSchemaRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<UnionSchemaRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one pair in schema order
    pub fn rows_for<'a>(&'a self, pair_id: &str) -> impl Iterator<Item = &'a UnionSchemaRow> {
        self.rows.iter().filter(move |row| row.pair_id == pair_id)
    }

    pub fn contains_pair(&self, pair_id: &str) -> bool {
        self.rows.iter().any(|row| row.pair_id == pair_id)
    }

    pub fn pair(&self, pair_id: &str) -> Option<PairInfo> {
        self.rows_for(pair_id).next().map(PairInfo::from)
    }

    /// Like [`UnionSchema::pair`], failing with [`Error::UnknownPair`]
    pub fn require_pair(&self, pair_id: &str) -> Result<PairInfo> {
        self.pair(pair_id)
            .ok_or_else(|| Error::UnknownPair(pair_id.to_string()))
    }

    /// Distinct pairs in schema order
    pub fn pairs(&self) -> Vec<PairInfo> {
        let mut seen = BTreeSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.pair_id.as_str()))
            .map(PairInfo::from)
            .collect()
    }

    /// Attribute keys of a pair in schema order
    pub fn keys(&self, pair_id: &str) -> Vec<&str> {
        self.rows_for(pair_id).map(|row| row.key.as_str()).collect()
    }

    /// Width of the code on `side` for a pair: the larger of the part-type
    /// prefix length and the last slot position. Unparsable slots are skipped
    /// here and reported by validation instead.
    pub fn code_width(&self, pair_id: &str, side: Side) -> Result<usize> {
        let pair = self.require_pair(pair_id)?;
        let prefix_width = pair.part_type(side).chars().count();
        let slot_end = self
            .rows_for(pair_id)
            .filter_map(|row| row.slot_range(side).ok().flatten())
            .map(|range| range.to)
            .max()
            .unwrap_or(0);
        Ok(prefix_width.max(slot_end))
    }
}

impl From<Vec<UnionSchemaRow>> for UnionSchema {
    fn from(rows: Vec<UnionSchemaRow>) -> Self {
        Self::new(rows)
    }
}

/// Text tokens for the boolean `required_*` columns
pub mod flag {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub const TRUE: &str = "TRUE";
    pub const FALSE: &str = "FALSE";

    /// Parse `TRUE`/`FALSE`/`1`/`0` case-insensitively; empty is false
    pub fn parse(token: &str) -> Option<bool> {
        match token.trim().to_ascii_uppercase().as_str() {
            "TRUE" | "1" => Some(true),
            "FALSE" | "0" | "" => Some(false),
            _ => None,
        }
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { TRUE } else { FALSE })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let token = String::deserialize(deserializer)?;
        parse(&token).ok_or_else(|| {
            de::Error::custom(format!(
                "invalid boolean token '{token}', expected TRUE, FALSE, 1, 0, or empty"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pair_id: &str, key: &str, ik_slot: &str, ok_slot: &str) -> UnionSchemaRow {
        let (ik, ok) = pair_id.split_once('_').unwrap();
        UnionSchemaRow {
            pair_id: pair_id.to_string(),
            ik_part_type: ik.to_string(),
            ok_part_type: ok.to_string(),
            key: key.to_string(),
            dtype: "int".to_string(),
            lookup: String::new(),
            required_ik: !ik_slot.is_empty(),
            required_ok: !ok_slot.is_empty(),
            ik_slot: ik_slot.to_string(),
            ik_codec: String::new(),
            ok_slot: ok_slot.to_string(),
            ok_codec: String::new(),
        }
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("ik".parse::<Side>().unwrap(), Side::Ik);
        assert_eq!(" OK ".parse::<Side>().unwrap(), Side::Ok);
        assert_eq!("옥천".parse::<Side>().unwrap(), Side::Ok);
        assert!("XK".parse::<Side>().is_err());
        assert_eq!(Side::Ik.other(), Side::Ok);
        assert_eq!(Side::Ok.to_string(), "OK");
    }

    #[test]
    fn test_flag_tokens() {
        assert_eq!(flag::parse("TRUE"), Some(true));
        assert_eq!(flag::parse("true"), Some(true));
        assert_eq!(flag::parse("True"), Some(true));
        assert_eq!(flag::parse("1"), Some(true));
        assert_eq!(flag::parse("0"), Some(false));
        assert_eq!(flag::parse(" "), Some(false));
        assert_eq!(flag::parse("yes"), None);
    }

    #[test]
    fn test_code_width_is_derived_per_side() {
        let schema = UnionSchema::new(vec![
            row("V111_2655", "length_mm", "9-11", ""),
            row("V111_2655", "material_code", "5-5", "5-6"),
        ]);
        assert_eq!(schema.code_width("V111_2655", Side::Ik).unwrap(), 11);
        assert_eq!(schema.code_width("V111_2655", Side::Ok).unwrap(), 6);
        assert!(matches!(
            schema.code_width("V999_0000", Side::Ik),
            Err(Error::UnknownPair(_))
        ));
    }

    #[test]
    fn test_pairs_are_distinct_and_ordered() {
        let schema = UnionSchema::new(vec![
            row("V111_2655", "a", "5-5", ""),
            row("V111_2655", "b", "6-6", ""),
            row("V112_2700", "a", "5-5", ""),
        ]);
        let pairs: Vec<String> = schema.pairs().into_iter().map(|p| p.pair_id).collect();
        assert_eq!(pairs, vec!["V111_2655", "V112_2700"]);
        assert_eq!(schema.keys("V111_2655"), vec!["a", "b"]);
    }

    #[test]
    fn test_slot_definition_display() {
        let def = SlotDefinition::new(5, 6, "material_lookup");
        assert_eq!(def.slot(), "5-6");
        assert_eq!(def.width(), 2);
        assert_eq!(
            def.to_string(),
            "pos_from=5, pos_to=6, lookup=material_lookup"
        );
    }

    #[test]
    fn test_slot_width_saturates() {
        assert_eq!(SlotDefinition::new(6, 5, "").width(), 0);
        assert_eq!(SlotDefinition::new(-1, i64::MAX, "").width(), i64::MAX);
        assert_eq!(SlotDefinition::new(i64::MAX, i64::MIN, "").width(), i64::MIN + 1);
    }
}
