//! Input planning for one base side
//!
//! Combines the key queries into what an entry form needs: the keys of the
//! base side, the extra keys that unlock the other side's code, and which of
//! them are still missing.

use crate::engine::CodecEngine;
use crate::Result;
use partcode_schema::{Attributes, Side};
use serde::Serialize;

/// Keys to collect when codes are entered from `base_side`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputPlan {
    pub pair_id: String,
    pub base_side: Side,
    /// Required on the base side, in schema order
    pub base_keys: Vec<String>,
    /// Required only on the other side, in schema order
    pub extra_keys: Vec<String>,
}

impl InputPlan {
    /// Build the plan for `pair_id` entered from `base_side`
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is not in the schema.
    pub fn new(engine: &CodecEngine<'_>, pair_id: &str, base_side: Side) -> Result<Self> {
        Ok(Self {
            pair_id: pair_id.to_string(),
            base_side,
            base_keys: owned(engine.required_keys(pair_id, base_side)?),
            extra_keys: owned(engine.extra_keys_from_other_side(pair_id, base_side)?),
        })
    }

    /// Check which planned keys `attrs` still lacks
    ///
    /// # Errors
    ///
    /// Returns an error if the plan's pair is not in the engine's schema.
    pub fn readiness(&self, engine: &CodecEngine<'_>, attrs: &Attributes) -> Result<Readiness> {
        let other = self.base_side.other();
        Ok(Readiness {
            base_side: self.base_side,
            missing_base: owned(engine.missing_required_keys(&self.pair_id, self.base_side, attrs)?),
            missing_other: owned(engine.missing_required_keys(&self.pair_id, other, attrs)?),
        })
    }
}

fn owned(keys: Vec<&str>) -> Vec<String> {
    keys.into_iter().map(str::to_string).collect()
}

/// Missing required keys per side for one attribute bag.
///
/// Missing base keys block an authoritative base code; missing other-side
/// keys only make the other code a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub base_side: Side,
    pub missing_base: Vec<String>,
    pub missing_other: Vec<String>,
}

impl Readiness {
    /// Missing required keys of `side`, in schema order
    pub fn missing(&self, side: Side) -> &[String] {
        if side == self.base_side {
            &self.missing_base
        } else {
            &self.missing_other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partcode_schema::{UnionSchema, UnionSchemaRow};

    fn row(key: &str, ik_slot: &str, ok_slot: &str) -> UnionSchemaRow {
        UnionSchemaRow {
            pair_id: "V111_2655".to_string(),
            ik_part_type: "V111".to_string(),
            ok_part_type: "2655".to_string(),
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
    fn test_plan_and_readiness() {
        let schema = UnionSchema::new(vec![
            row("grade", "", "7-7"),
            row("length_mm", "9-11", "8-10"),
            row("nominal", "8-8", ""),
        ]);
        let engine = CodecEngine::new(&schema);
        let plan = InputPlan::new(&engine, "V111_2655", Side::Ik).unwrap();
        assert_eq!(plan.base_keys, vec!["length_mm", "nominal"]);
        assert_eq!(plan.extra_keys, vec!["grade"]);

        let mut attrs = Attributes::new();
        attrs.insert("length_mm".into(), "8".into());
        attrs.insert("nominal".into(), "4".into());
        let readiness = plan.readiness(&engine, &attrs).unwrap();
        assert!(readiness.missing(Side::Ik).is_empty());
        assert_eq!(readiness.missing(Side::Ok), ["grade"]);

        attrs.insert("grade".into(), " ".into());
        attrs.remove("nominal");
        let readiness = plan.readiness(&engine, &attrs).unwrap();
        assert_eq!(readiness.missing(Side::Ik), ["nominal"]);
        assert_eq!(readiness.missing(Side::Ok), ["grade"]);
    }

    #[test]
    fn test_plan_unknown_pair() {
        let schema = UnionSchema::default();
        let engine = CodecEngine::new(&schema);
        assert!(InputPlan::new(&engine, "V111_2655", Side::Ok).is_err());
    }
}
