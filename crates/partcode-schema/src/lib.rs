//! # partcode-schema
//!
//! Schema model, normalization, and union logic for the IK/OK part codes.
//!
//! Each site describes its positional code in a raw schema table
//! (`part_type, pos_from, pos_to, attr_name, lookup_table`). A cross-reference
//! table pairs IK part-types with OK part-types. [`SchemaUnifier`] merges the
//! three into one [`UnionSchema`]: one row per (pair, attribute key) carrying
//! per-side requiredness, slot range, and codec descriptor.
//!
//! ## Example Usage
//!
//! ```rust
//! use partcode_schema::{SchemaUnifier, StringTable};
//!
//! let ik = StringTable::from_rows(
//!     "codeSchema_IK",
//!     &["part_type", "pos_from", "pos_to", "attr_name", "lookup_table"],
//!     vec![vec!["V111", "5", "5", "material_code", "material_lookup"]],
//! );
//! let ok = StringTable::from_rows(
//!     "codeSchema_OK",
//!     &["part_type", "pos_from", "pos_to", "attr_name", "lookup_table"],
//!     vec![vec!["2655", "5", "6", "material_code", "material_lookup"]],
//! );
//! let cross_map = StringTable::from_rows(
//!     "Cross_Map",
//!     &["ik_part_type", "ok_part_type"],
//!     vec![vec!["V111", "2655"]],
//! );
//!
//! let unified = SchemaUnifier::new().unify(&ik, &ok, &cross_map).unwrap();
//! let row = &unified.schema.rows()[0];
//! assert_eq!(row.pair_id, "V111_2655");
//! assert_eq!(row.ok_slot, "5-6");
//! ```

pub mod columns;
pub mod descriptor;
pub mod model;
pub mod normalize;
pub mod slot;
pub mod table;
pub mod unifier;

pub use columns::{ColumnDetector, ColumnMatcher, ColumnNotFound};
pub use descriptor::{CodecDescriptor, DataType};
pub use model::{
    Attributes, CrossReference, PairInfo, SchemaRow, Side, SlotDefinition, UnionSchema,
    UnionSchemaRow,
};
pub use slot::{MAX_POSITION, SlotRange};
pub use table::StringTable;
pub use unifier::{
    DefinitionConflict, RAW_SCHEMA_COLUMNS, SchemaUnifier, UnifierConfig, Unification,
    UnmappedPair,
};

use thiserror::Error;

/// Errors that can occur when working with schemas
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("[{table}] missing required columns {missing:?}; present columns: {present:?}")]
    MissingColumns {
        table: String,
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error(transparent)]
    ColumnNotFound(#[from] ColumnNotFound),

    #[error(transparent)]
    Conflict(#[from] DefinitionConflict),

    #[error("[{table}] row {row}: {column} '{value}' is outside the supported positions")]
    PositionOutOfRange {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid slot '{slot}': {reason}")]
    InvalidSlot { slot: String, reason: String },

    #[error("Unknown pair_id '{0}'")]
    UnknownPair(String),

    #[error("Invalid side '{0}', expected IK or OK")]
    InvalidSide(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl Error {
    /// Create an invalid-slot error
    pub fn invalid_slot(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSlot {
            slot: slot.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
