//! Codec engine
//!
//! Encodes attribute bags into fixed-width codes and decodes codes back,
//! using only the union schema.

use crate::transforms::encode_value;
use crate::{Error, Result};
use partcode_schema::normalize::is_blank;
use partcode_schema::{Attributes, PairInfo, Side, UnionSchema};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace, warn};

/// Character written into positions no attribute filled
pub const DEFAULT_FILL_CHAR: char = '?';

/// Encoding and decoding options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    /// Replacement for unfilled positions (default `?`)
    pub fill_char: char,
    /// Declared code width. The effective width is never smaller than the
    /// width the schema implies, so no slot is cut off.
    pub code_width: Option<usize>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            fill_char: DEFAULT_FILL_CHAR,
            code_width: None,
        }
    }
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill character
    pub fn fill_char(mut self, fill_char: char) -> Self {
        self.fill_char = fill_char;
        self
    }

    /// Declare a fixed code width
    pub fn code_width(mut self, width: usize) -> Self {
        self.code_width = Some(width);
        self
    }
}

/// Something worth telling the caller about an encode call. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodeNotice {
    /// The prefix did not fit in the code and was cut
    PrefixTruncated { prefix: String, width: usize },
    /// A value overflowed its slot; only the trailing characters were kept
    SegmentTruncated {
        key: String,
        encoded: String,
        kept: String,
    },
    /// The slot string could not be parsed; the attribute was skipped
    InvalidSlot { key: String, slot: String },
}

impl fmt::Display for EncodeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrefixTruncated { prefix, width } => {
                write!(f, "prefix '{prefix}' truncated to {width} characters")
            }
            Self::SegmentTruncated { key, encoded, kept } => {
                write!(f, "{key}: '{encoded}' overflows its slot, kept '{kept}'")
            }
            Self::InvalidSlot { key, slot } => write!(f, "{key}: unusable slot '{slot}'"),
        }
    }
}

/// A code for one side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub side: Side,
    pub pair_id: String,
    /// Always exactly the code width
    pub code: String,
    pub notices: Vec<EncodeNotice>,
}

impl fmt::Display for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Codes for both sides from one attribute bag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedPair {
    pub ik: Encoded,
    pub ok: Encoded,
}

impl EncodedPair {
    pub fn get(&self, side: Side) -> &Encoded {
        match side {
            Side::Ik => &self.ik,
            Side::Ok => &self.ok,
        }
    }
}

/// A decoded code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub side: Side,
    pub pair_id: String,
    pub part_type: String,
    /// Raw slot contents by key; lookup slots hold codes, not labels
    pub attrs: Attributes,
}

/// Codec engine over one union schema snapshot
#[derive(Debug, Clone)]
pub struct CodecEngine<'a> {
    schema: &'a UnionSchema,
    options: CodecOptions,
}

impl<'a> CodecEngine<'a> {
    /// Create an engine with default options
    pub fn new(schema: &'a UnionSchema) -> Self {
        Self {
            schema,
            options: CodecOptions::default(),
        }
    }

    /// Create an engine with specific options
    pub fn with_options(schema: &'a UnionSchema, options: CodecOptions) -> Self {
        Self { schema, options }
    }

    pub fn schema(&self) -> &'a UnionSchema {
        self.schema
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Keys required on `side`, in schema order
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is not in the schema.
    pub fn required_keys(&self, pair_id: &str, side: Side) -> Result<Vec<&'a str>> {
        self.schema.require_pair(pair_id)?;
        Ok(self
            .schema
            .rows_for(pair_id)
            .filter(|row| row.required(side))
            .map(|row| row.key.as_str())
            .collect())
    }

    /// Keys the other side requires that `base_side` does not.
    ///
    /// These are exactly the extra inputs needed, beyond the base side's own,
    /// to also produce the other side's code.
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is not in the schema.
    pub fn extra_keys_from_other_side(&self, pair_id: &str, base_side: Side) -> Result<Vec<&'a str>> {
        self.schema.require_pair(pair_id)?;
        let other = base_side.other();
        Ok(self
            .schema
            .rows_for(pair_id)
            .filter(|row| row.required(other) && !row.required(base_side))
            .map(|row| row.key.as_str())
            .collect())
    }

    /// Keys required on `side` whose value is absent or blank, in schema order
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is not in the schema.
    pub fn missing_required_keys(
        &self,
        pair_id: &str,
        side: Side,
        attrs: &Attributes,
    ) -> Result<Vec<&'a str>> {
        Ok(self
            .required_keys(pair_id, side)?
            .into_iter()
            .filter(|key| attrs.get(*key).is_none_or(|v| is_blank(v)))
            .collect())
    }

    /// Effective code width of a pair on one side
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is not in the schema.
    pub fn code_width(&self, pair_id: &str, side: Side) -> Result<usize> {
        let derived = self.schema.code_width(pair_id, side)?;
        Ok(self.options.code_width.map_or(derived, |declared| declared.max(derived)))
    }

    /// Encode the code for one side.
    ///
    /// `base_prefix` defaults to the pair's part-type on `side`. Missing or
    /// blank attributes leave their slots unfilled; the result is a valid
    /// preview. Use [`CodecEngine::missing_required_keys`] before treating
    /// the code as authoritative.
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is not in the schema.
    pub fn encode(
        &self,
        side: Side,
        pair_id: &str,
        attrs: &Attributes,
        base_prefix: Option<&str>,
    ) -> Result<Encoded> {
        let pair = self.schema.require_pair(pair_id)?;
        let width = self.code_width(pair_id, side)?;
        let mut buffer: Vec<Option<char>> = vec![None; width];
        let mut notices = Vec::new();

        let prefix = base_prefix.unwrap_or_else(|| pair.part_type(side));
        if prefix.chars().count() > width {
            warn!(pair_id, %side, prefix, width, "Prefix longer than the code; truncating");
            notices.push(EncodeNotice::PrefixTruncated {
                prefix: prefix.to_string(),
                width,
            });
        }
        for (cell, ch) in buffer.iter_mut().zip(prefix.chars()) {
            *cell = Some(ch);
        }

        for row in self.schema.rows_for(pair_id) {
            let range = match row.slot_range(side) {
                Ok(Some(range)) => range,
                Ok(None) => continue,
                Err(error) => {
                    warn!(pair_id, %side, key = %row.key, %error, "Skipping unusable slot");
                    notices.push(EncodeNotice::InvalidSlot {
                        key: row.key.clone(),
                        slot: row.slot(side).to_string(),
                    });
                    continue;
                }
            };

            let Some(value) = attrs.get(&row.key).filter(|v| !is_blank(v)) else {
                trace!(pair_id, %side, key = %row.key, "No value; slot left unfilled");
                continue;
            };

            let segment = encode_value(value, &row.codec_descriptor(side), range.width());
            if let Some(encoded) = segment.truncated_from {
                notices.push(EncodeNotice::SegmentTruncated {
                    key: row.key.clone(),
                    encoded,
                    kept: segment.text.clone(),
                });
            }

            for (cell, ch) in buffer
                .iter_mut()
                .skip(range.start_index())
                .zip(segment.text.chars())
            {
                *cell = Some(ch);
            }
        }

        let code: String = buffer
            .into_iter()
            .map(|cell| cell.unwrap_or(self.options.fill_char))
            .collect();
        debug!(pair_id, %side, %code, "Encoded");

        Ok(Encoded {
            side,
            pair_id: pair.pair_id,
            code,
            notices,
        })
    }

    /// Encode both sides, each with its own part-type prefix
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is not in the schema.
    pub fn encode_both(&self, pair_id: &str, attrs: &Attributes) -> Result<EncodedPair> {
        Ok(EncodedPair {
            ik: self.encode(Side::Ik, pair_id, attrs, None)?,
            ok: self.encode(Side::Ok, pair_id, attrs, None)?,
        })
    }

    /// Decode a code of `side`, locating its pair by part-type prefix.
    ///
    /// The longest matching part-type wins. When several pairs share that
    /// part-type, the first in schema order is used; their slots on `side`
    /// come from the same site schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMatchingPartType`] if no part-type of `side` is a
    /// prefix of the code.
    pub fn decode(&self, side: Side, code: &str) -> Result<Decoded> {
        let code = code.trim();
        let pair = self
            .match_pair(side, code)
            .ok_or_else(|| Error::NoMatchingPartType {
                side,
                code: code.to_string(),
            })?;
        Ok(self.slice(side, &pair, code))
    }

    /// Decode a code against a known pair
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is unknown or the code does not start
    /// with the pair's part-type on `side`.
    pub fn decode_with_pair(&self, pair_id: &str, side: Side, code: &str) -> Result<Decoded> {
        let code = code.trim();
        let pair = self.schema.require_pair(pair_id)?;
        if !starts_with_part_type(code, pair.part_type(side)) {
            return Err(Error::PrefixMismatch {
                part_type: pair.part_type(side).to_string(),
                pair_id: pair.pair_id,
                code: code.to_string(),
            });
        }
        Ok(self.slice(side, &pair, code))
    }

    fn match_pair(&self, side: Side, code: &str) -> Option<PairInfo> {
        let mut best: Option<PairInfo> = None;
        for pair in self.schema.pairs() {
            let part_type = pair.part_type(side);
            if part_type.is_empty() || !starts_with_part_type(code, part_type) {
                continue;
            }
            let longer = best
                .as_ref()
                .is_none_or(|b| part_type.len() > b.part_type(side).len());
            if longer {
                best = Some(pair);
            }
        }
        best
    }

    fn slice(&self, side: Side, pair: &PairInfo, code: &str) -> Decoded {
        let chars: Vec<char> = code.chars().collect();
        let mut attrs = Attributes::new();

        for row in self.schema.rows_for(&pair.pair_id) {
            let Ok(Some(range)) = row.slot_range(side) else {
                continue;
            };
            if range.start_index() >= chars.len() {
                continue;
            }
            let end = range.end_index().min(chars.len());
            // unpadded lookup codes leave fill characters at the end of their slot
            let segment: String = chars[range.start_index()..end].iter().collect();
            let segment = segment.trim_end_matches(self.options.fill_char);
            if segment.is_empty() {
                continue;
            }
            attrs.insert(row.key.clone(), segment.to_string());
        }

        debug!(pair_id = %pair.pair_id, %side, keys = attrs.len(), "Decoded");
        Decoded {
            side,
            pair_id: pair.pair_id.clone(),
            part_type: pair.part_type(side).to_string(),
            attrs,
        }
    }
}

fn starts_with_part_type(code: &str, part_type: &str) -> bool {
    code.get(..part_type.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(part_type))
}
