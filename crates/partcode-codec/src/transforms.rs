//! Per-slot value transforms
//!
//! Turns one attribute value into the characters written into its slot.

use crate::numeric::decimal_repr;
use partcode_schema::CodecDescriptor;

/// Characters destined for one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Encoded text, at most the slot width in characters
    pub text: String,
    /// Codec output before overflow truncation, when truncation happened
    pub truncated_from: Option<String>,
}

/// Encode `value` with `codec` for a slot `slot_width` characters wide.
///
/// - `lookup:*` writes the value verbatim; lookup codes are never padded.
/// - `int:width=N,pad=P` writes the decimal representation left-padded to
///   `N` with `P`, padding after a minus sign. Non-numeric text is padded as
///   given.
/// - Empty or unrecognized codecs zero-pad to the slot width.
///
/// Output longer than the slot keeps its last `slot_width` characters.
pub fn encode_value(value: &str, codec: &CodecDescriptor, slot_width: usize) -> Segment {
    let value = value.trim();
    let encoded = match codec {
        CodecDescriptor::Lookup => value.to_string(),
        CodecDescriptor::Int { width, pad } => match decimal_repr(value) {
            // the sign stays in front of the padding
            Some(digits) => match digits.strip_prefix('-') {
                Some(magnitude) => format!("-{}", pad_left(magnitude, width.saturating_sub(1), *pad)),
                None => pad_left(&digits, *width, *pad),
            },
            None => pad_left(value, *width, *pad),
        },
        CodecDescriptor::Empty | CodecDescriptor::Unrecognized(_) => pad_left(value, slot_width, '0'),
    };
    fit_to_width(encoded, slot_width)
}

/// Left-pad to `width` characters with `pad`; longer input is returned as is
pub fn pad_left(value: &str, width: usize, pad: char) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    let mut padded: String = std::iter::repeat_n(pad, width - len).collect();
    padded.push_str(value);
    padded
}

/// Keep the last `width` characters (the least-significant digits)
pub fn keep_suffix(value: &str, width: usize) -> String {
    let len = value.chars().count();
    value.chars().skip(len.saturating_sub(width)).collect()
}

fn fit_to_width(encoded: String, width: usize) -> Segment {
    if encoded.chars().count() > width {
        Segment {
            text: keep_suffix(&encoded, width),
            truncated_from: Some(encoded),
        }
    } else {
        Segment {
            text: encoded,
            truncated_from: None,
        }
    }
}
