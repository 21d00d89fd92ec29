//! Validation engine

use crate::lookup::LookupRegistry;
use crate::reporter::ValidationReport;
use crate::rules::{
    check_dtype, check_lookup_code, check_lookup_name, check_orphan, check_required_side,
    check_slot_syntax,
};
use crate::Result;
use partcode_schema::{Attributes, Side, UnionSchema};
use tracing::{debug, info};

/// Validation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Report lookup tables the schema names but the registry lacks.
    /// Off by default: a table that is not loaded accepts every code.
    pub require_lookup_tables: bool,
}

impl ValidationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn require_lookup_tables(mut self, require: bool) -> Self {
        self.require_lookup_tables = require;
        self
    }
}

/// Runs the row rules over a union schema
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    config: ValidationConfig,
}

impl ValidationEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Check every row for schema drift. Never fails; the report is the result.
    #[must_use]
    pub fn validate(&self, schema: &UnionSchema) -> ValidationReport {
        let mut report = ValidationReport::new();
        for row in schema.rows() {
            for side in Side::ALL {
                report.extend(check_required_side(row, side));
                report.extend(check_slot_syntax(row, side));
            }
            report.extend(check_dtype(row));
            report.extend(check_lookup_name(row));
            report.extend(check_orphan(row));
            report.rows_checked += 1;
        }

        if report.is_clean() {
            debug!(rows = report.rows_checked, "Union schema validated clean");
        } else {
            info!(
                rows = report.rows_checked,
                issues = report.len(),
                "Union schema validation found issues"
            );
        }
        report
    }

    /// Check lookup-typed values of an attribute bag against the lookup
    /// tables. Only keys with a slot on `side` are checked.
    ///
    /// # Errors
    ///
    /// Returns an error if `pair_id` is not in the schema.
    pub fn validate_lookup_codes(
        &self,
        schema: &UnionSchema,
        pair_id: &str,
        side: Side,
        attrs: &Attributes,
        registry: &LookupRegistry,
    ) -> Result<ValidationReport> {
        schema.require_pair(pair_id)?;
        let mut report = ValidationReport::new();
        for row in schema.rows_for(pair_id).filter(|row| row.required(side)) {
            if let Some(value) = attrs.get(&row.key) {
                report.extend(check_lookup_code(
                    row,
                    side,
                    value,
                    registry,
                    self.config.require_lookup_tables,
                ));
            }
            report.rows_checked += 1;
        }
        debug!(pair_id, %side, issues = report.len(), "Lookup codes checked");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupTable;
    use crate::reporter::IssueCategory;
    use partcode_schema::UnionSchemaRow;

    fn row(key: &str, dtype: &str, lookup: &str, ik_slot: &str, ok_slot: &str) -> UnionSchemaRow {
        let codec = |slot: &str| {
            if slot.is_empty() {
                String::new()
            } else if dtype == "lookup" {
                "lookup:code".to_string()
            } else {
                "int:width=1,pad=0".to_string()
            }
        };
        UnionSchemaRow {
            pair_id: "V111_2655".to_string(),
            ik_part_type: "V111".to_string(),
            ok_part_type: "2655".to_string(),
            key: key.to_string(),
            dtype: dtype.to_string(),
            lookup: lookup.to_string(),
            required_ik: !ik_slot.is_empty(),
            required_ok: !ok_slot.is_empty(),
            ik_slot: ik_slot.to_string(),
            ik_codec: codec(ik_slot),
            ok_slot: ok_slot.to_string(),
            ok_codec: codec(ok_slot),
        }
    }

    #[test]
    fn test_clean_schema() {
        let schema = UnionSchema::new(vec![
            row("material_code", "lookup", "material_lookup", "5-5", "5-6"),
            row("nominal", "int", "", "6-6", ""),
        ]);
        let report = ValidationEngine::new().validate(&schema);
        assert!(report.is_clean());
        assert_eq!(report.rows_checked, 2);
    }

    #[test]
    fn test_drift_is_reported_not_fatal() {
        let mut broken = row("nominal", "", "", "6-6", "7-7");
        broken.ik_codec.clear();
        let schema = UnionSchema::new(vec![
            broken,
            row("material_code", "lookup", "", "5-5", "0-1"),
            row("ghost", "int", "", "", ""),
        ]);
        let report = ValidationEngine::new().validate(&schema);
        let counts = report.counts_by_category();
        assert_eq!(counts[&IssueCategory::IkMissingCodec], 1);
        assert_eq!(counts[&IssueCategory::MissingDtype], 1);
        assert_eq!(counts[&IssueCategory::MissingLookup], 1);
        assert_eq!(counts[&IssueCategory::InvalidSlot], 1);
        assert_eq!(counts[&IssueCategory::OrphanRow], 1);
        assert_eq!(report.len(), 5);
    }

    #[test]
    fn test_validate_lookup_codes() {
        let schema = UnionSchema::new(vec![
            row("material_code", "lookup", "material_lookup", "5-5", "5-6"),
            row("grade", "lookup", "grade_lookup", "", "7-7"),
        ]);
        let mut material = LookupTable::new("material_lookup");
        material.insert("*", "1", "SS400");
        let registry: LookupRegistry = std::iter::once(material).collect();

        let mut attrs = Attributes::new();
        attrs.insert("material_code".into(), "9".into());
        attrs.insert("grade".into(), "A".into());

        let engine = ValidationEngine::new();
        let report = engine
            .validate_lookup_codes(&schema, "V111_2655", Side::Ik, &attrs, &registry)
            .unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.issues()[0].key, "material_code");

        let strict = ValidationEngine::with_config(ValidationConfig::new().require_lookup_tables(true));
        let report = strict
            .validate_lookup_codes(&schema, "V111_2655", Side::Ok, &attrs, &registry)
            .unwrap();
        assert_eq!(
            report.counts_by_category()[&IssueCategory::MissingLookupTable],
            1
        );

        assert!(engine
            .validate_lookup_codes(&schema, "V000_0000", Side::Ik, &attrs, &registry)
            .is_err());
    }
}
