#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # partcode-validation
//!
//! Post-build checks of the union schema and lookup tables.
//!
//! Validation never fails a build: it returns a [`ValidationReport`] of
//! findings grouped by category (missing slot or codec per side, missing
//! dtype, missing lookup name, invalid slot, orphan row) for an operator to
//! act on. Lookup tables map codes to labels with a common `*` tier and
//! part-type overrides, and back the optional strict lookup-code check.
//!
//! ## Example Usage
//!
//! ```rust
//! use partcode_schema::{UnionSchema, UnionSchemaRow};
//! use partcode_validation::{IssueCategory, ValidationEngine};
//!
//! let schema = UnionSchema::new(vec![UnionSchemaRow {
//!     pair_id: "V111_2655".into(),
//!     ik_part_type: "V111".into(),
//!     ok_part_type: "2655".into(),
//!     key: "material_code".into(),
//!     dtype: "lookup".into(),
//!     lookup: String::new(),
//!     required_ik: true,
//!     required_ok: false,
//!     ik_slot: "5-5".into(),
//!     ik_codec: "lookup:code".into(),
//!     ok_slot: String::new(),
//!     ok_codec: String::new(),
//! }]);
//!
//! let report = ValidationEngine::new().validate(&schema);
//! assert_eq!(report.counts_by_category()[&IssueCategory::MissingLookup], 1);
//! ```

pub mod engine;
pub mod lookup;
pub mod reporter;
pub mod rules;

pub use engine::{ValidationConfig, ValidationEngine};
pub use lookup::{LookupRegistry, LookupTable, WILDCARD, ik_group_key};
pub use reporter::{IssueCategory, ValidationIssue, ValidationReport};

use partcode_schema::UnionSchema;
use thiserror::Error;

/// Errors that can occur during validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(#[from] partcode_schema::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Validate a union schema with default settings
#[must_use]
pub fn validate(schema: &UnionSchema) -> ValidationReport {
    ValidationEngine::new().validate(schema)
}
