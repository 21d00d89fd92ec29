//! Slot ranges within a fixed-width code

use crate::{Error, Result};
use std::fmt;

/// Separators accepted in place of a plain hyphen. Slot strings are
/// hand-authored or written by differing tool revisions.
const DASH_VARIANTS: [char; 4] = ['\u{2013}', '\u{2011}', '~', ':'];

/// Highest position a slot may reach. Codes are short identifiers; larger
/// positions come from corrupted cells.
pub const MAX_POSITION: usize = 4096;

/// A 1-based inclusive character range, `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRange {
    pub from: usize,
    pub to: usize,
}

impl SlotRange {
    /// Create a range, rejecting position 0, empty ranges and positions
    /// past [`MAX_POSITION`]
    pub fn new(from: usize, to: usize) -> Result<Self> {
        if from == 0 {
            return Err(Error::invalid_slot(
                format!("{from}-{to}"),
                "positions are 1-based",
            ));
        }
        if to < from {
            return Err(Error::invalid_slot(
                format!("{from}-{to}"),
                "end position precedes start position",
            ));
        }
        if to > MAX_POSITION {
            return Err(Error::invalid_slot(
                format!("{from}-{to}"),
                format!("positions end at {MAX_POSITION}"),
            ));
        }
        Ok(Self { from, to })
    }

    /// Single-character slot
    pub fn single(position: usize) -> Result<Self> {
        Self::new(position, position)
    }

    /// Parse `"5-6"`, `"5–6"`, `"5‑6"`, or `"5"`. Blank (or `nan`) is `Ok(None)`.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }

        let unified: String = trimmed
            .chars()
            .map(|c| if DASH_VARIANTS.contains(&c) { '-' } else { c })
            .collect();

        let (from, to) = match unified.split_once('-') {
            Some((from, to)) => (parse_position(raw, from)?, parse_position(raw, to)?),
            None => {
                let position = parse_position(raw, &unified)?;
                (position, position)
            }
        };

        Self::new(from, to)
            .map(Some)
            .map_err(|_| {
                Error::invalid_slot(raw, format!("range must lie within 1-{MAX_POSITION} with start <= end"))
            })
    }

    /// Number of characters covered
    pub fn width(&self) -> usize {
        self.to - self.from + 1
    }

    /// 0-based index of the first character
    pub fn start_index(&self) -> usize {
        self.from - 1
    }

    /// 0-based exclusive end index
    pub fn end_index(&self) -> usize {
        self.to
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

fn parse_position(raw: &str, part: &str) -> Result<usize> {
    part.trim()
        .parse::<usize>()
        .map_err(|_| Error::invalid_slot(raw, format!("'{}' is not a position", part.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_range() {
        let range = SlotRange::parse("5-6").unwrap().unwrap();
        assert_eq!(range, SlotRange { from: 5, to: 6 });
        assert_eq!(range.width(), 2);
        assert_eq!(range.start_index(), 4);
        assert_eq!(range.end_index(), 6);
    }

    #[test]
    fn test_parse_dash_variants() {
        let expected = SlotRange::new(7, 8).unwrap();
        for raw in ["7\u{2013}8", "7\u{2011}8", "7~8", "7:8", " 7 - 8 "] {
            assert_eq!(SlotRange::parse(raw).unwrap(), Some(expected), "{raw}");
        }
    }

    #[test]
    fn test_parse_single_position() {
        let range = SlotRange::parse("5").unwrap().unwrap();
        assert_eq!(range, SlotRange::single(5).unwrap());
        assert_eq!(range.width(), 1);
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(SlotRange::parse("").unwrap(), None);
        assert_eq!(SlotRange::parse("  ").unwrap(), None);
        assert_eq!(SlotRange::parse("nan").unwrap(), None);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            SlotRange::parse("a-b"),
            Err(Error::InvalidSlot { .. })
        ));
        assert!(SlotRange::parse("0-0").is_err());
        assert!(SlotRange::parse("6-5").is_err());
        assert!(SlotRange::parse("1-100000000").is_err());
        assert!(SlotRange::parse("4096").is_ok());
    }

    #[test]
    fn test_display_uses_plain_hyphen() {
        assert_eq!(SlotRange::new(9, 11).unwrap().to_string(), "9-11");
    }
}
