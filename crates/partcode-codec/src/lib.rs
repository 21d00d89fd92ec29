//! # partcode-codec
//!
//! Encoder and decoder for the IK/OK fixed-width part codes.
//!
//! The engine reads nothing but a [`UnionSchema`]: it answers which keys a
//! side requires, which extra keys produce the other side's code, which
//! required values are still missing, and it encodes attribute bags into
//! codes and decodes codes back into attribute bags.
//!
//! ## Example Usage
//!
//! ```rust
//! use partcode_codec::CodecEngine;
//! use partcode_schema::{Attributes, Side, UnionSchema, UnionSchemaRow};
//!
//! let schema = UnionSchema::new(vec![UnionSchemaRow {
//!     pair_id: "V111_2655".into(),
//!     ik_part_type: "V111".into(),
//!     ok_part_type: "2655".into(),
//!     key: "material_code".into(),
//!     dtype: "lookup".into(),
//!     lookup: "material_lookup".into(),
//!     required_ik: true,
//!     required_ok: true,
//!     ik_slot: "5-5".into(),
//!     ik_codec: "lookup:code".into(),
//!     ok_slot: "5-6".into(),
//!     ok_codec: "lookup:code".into(),
//! }]);
//!
//! let engine = CodecEngine::new(&schema);
//! let mut attrs = Attributes::new();
//! attrs.insert("material_code".into(), "7".into());
//!
//! let both = engine.encode_both("V111_2655", &attrs).unwrap();
//! assert_eq!(both.ik.code, "V1117");
//! assert_eq!(both.ok.code, "26557?");
//! ```

pub mod engine;
mod numeric;
pub mod plan;
pub mod transforms;

pub use engine::{
    CodecEngine, CodecOptions, DEFAULT_FILL_CHAR, Decoded, EncodeNotice, Encoded, EncodedPair,
};
pub use plan::{InputPlan, Readiness};

use partcode_schema::Side;
use thiserror::Error;

/// Errors that can occur during encoding or decoding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(#[from] partcode_schema::Error),

    #[error("No {side} part-type in the union schema matches code '{code}'")]
    NoMatchingPartType { side: Side, code: String },

    #[error("Code '{code}' does not start with part-type '{part_type}' of pair {pair_id}")]
    PrefixMismatch {
        pair_id: String,
        part_type: String,
        code: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
