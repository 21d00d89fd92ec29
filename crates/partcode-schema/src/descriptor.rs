//! Codec descriptors and data type inference

use crate::model::SlotDefinition;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static WIDTH_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"width\s*=\s*(\d+)").expect("valid width regex"));
static PAD_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pad\s*=\s*([0-9A-Za-z])").expect("valid pad regex"));

/// Default fill character of the `int:` codec
pub const DEFAULT_PAD: char = '0';

/// How one attribute's value is written into its slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecDescriptor {
    /// `lookup:code` - the value is already a code and is written verbatim
    Lookup,
    /// `int:width=N,pad=P` - decimal value left-padded to `width` with `pad`
    Int { width: usize, pad: char },
    /// No codec recorded for this side
    Empty,
    /// A descriptor this version does not know
    Unrecognized(String),
}

impl CodecDescriptor {
    /// Parse a descriptor string. Never fails; unknown text is kept as
    /// [`CodecDescriptor::Unrecognized`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if trimmed.starts_with("lookup:") {
            return Self::Lookup;
        }
        if trimmed.starts_with("int:") {
            let width = WIDTH_PARAM
                .captures(trimmed)
                .and_then(|caps| caps[1].parse::<usize>().ok())
                .unwrap_or(1);
            let pad = PAD_PARAM
                .captures(trimmed)
                .and_then(|caps| caps[1].chars().next())
                .unwrap_or(DEFAULT_PAD);
            return Self::Int { width, pad };
        }
        Self::Unrecognized(trimmed.to_string())
    }

    /// Zero-padded integer codec of the given width
    pub fn int(width: usize) -> Self {
        Self::Int {
            width,
            pad: DEFAULT_PAD,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CodecDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup => f.write_str("lookup:code"),
            Self::Int { width, pad } => write!(f, "int:width={width},pad={pad}"),
            Self::Empty => Ok(()),
            Self::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// Attribute data type recorded in the union schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Lookup,
    Int,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::Int => "int",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infer `(dtype, lookup, codec)` for one side's definition.
///
/// A lookup table yields `lookup:code`; otherwise the slot width gives
/// `int:width=N,pad=0`, or no codec when the range is empty or inverted.
pub fn infer(definition: &SlotDefinition) -> (DataType, String, CodecDescriptor) {
    let lookup = definition.lookup.trim();
    if !lookup.is_empty() {
        return (DataType::Lookup, lookup.to_string(), CodecDescriptor::Lookup);
    }
    match usize::try_from(definition.width()) {
        Ok(width) if width > 0 => (DataType::Int, String::new(), CodecDescriptor::int(width)),
        _ => (DataType::Int, String::new(), CodecDescriptor::Empty),
    }
}
