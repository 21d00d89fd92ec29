//! Batch rebuild of the union schema artifact
//!
//! Raw IK schema, raw OK schema and cross-reference file in, validated union
//! schema artifact out. Any build error aborts the rebuild before the output
//! file is touched, so a previous artifact survives a bad input.

use crate::snapshot::SchemaSnapshot;
use crate::{Error, Result};
use partcode_adapter_csv::{CsvConfig, CsvReader, CsvWriter, load_cross_map, write_union_schema};
use partcode_schema::{SchemaUnifier, StringTable, UnifierConfig, UnmappedPair};
use partcode_validation::{ValidationEngine, ValidationReport};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Inputs and settings for one rebuild
#[derive(Debug, Clone)]
pub struct RebuildRequest {
    pub ik_schema: PathBuf,
    pub ok_schema: PathBuf,
    pub cross_map: PathBuf,
    pub output: PathBuf,
    /// Cross-reference column aliases
    pub unifier: UnifierConfig,
    pub csv: CsvConfig,
    pub validation: ValidationEngine,
}

impl RebuildRequest {
    pub fn new(
        ik_schema: impl Into<PathBuf>,
        ok_schema: impl Into<PathBuf>,
        cross_map: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ik_schema: ik_schema.into(),
            ok_schema: ok_schema.into(),
            cross_map: cross_map.into(),
            output: output.into(),
            unifier: UnifierConfig::default(),
            csv: CsvConfig::default(),
            validation: ValidationEngine::default(),
        }
    }

    #[must_use]
    pub fn with_unifier_config(mut self, config: UnifierConfig) -> Self {
        self.unifier = config;
        self
    }

    #[must_use]
    pub fn with_csv_config(mut self, config: CsvConfig) -> Self {
        self.csv = config;
        self
    }

    #[must_use]
    pub fn with_validation(mut self, engine: ValidationEngine) -> Self {
        self.validation = engine;
        self
    }
}

/// What a successful rebuild produced
#[derive(Debug, Clone)]
pub struct RebuildOutcome {
    pub schema: SchemaSnapshot,
    pub report: ValidationReport,
    /// Cross-referenced pairs missing from one or both raw schemas
    pub unmapped: Vec<UnmappedPair>,
    /// Cross-reference rows dropped for a blank part-type
    pub skipped_cross_references: usize,
    pub output: PathBuf,
}

impl fmt::Display for RebuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Wrote {} rows for {} pairs to {}",
            self.schema.len(),
            self.schema.pairs().len(),
            self.output.display()
        )?;
        for entry in &self.unmapped {
            writeln!(f, "warning: {entry}")?;
        }
        if self.skipped_cross_references > 0 {
            writeln!(
                f,
                "warning: {} cross-reference rows skipped (blank part-type)",
                self.skipped_cross_references
            )?;
        }
        write!(f, "{}", self.report)
    }
}

/// Rebuild the union schema artifact.
///
/// # Errors
///
/// Fails when an input cannot be read or decoded, a required column is
/// missing, the cross-reference columns cannot be detected, duplicate rows
/// conflict, or the artifact cannot be written. Nothing is written on a
/// failure before the write step.
pub fn rebuild(request: &RebuildRequest) -> Result<RebuildOutcome> {
    let reader = CsvReader::new().with_config(request.csv.clone());

    let ik = read_input(&reader, &request.ik_schema)?;
    let ok = read_input(&reader, &request.ok_schema)?;
    let cross_map = load_cross_map(&reader, &request.cross_map, &request.unifier)
        .map_err(|e| Error::file("read", &request.cross_map, e))?;

    // the loaded cross map always carries the canonical column names
    let unification = SchemaUnifier::new().unify(&ik, &ok, &cross_map.table)?;
    let report = request.validation.validate(&unification.schema);
    if !report.is_clean() {
        warn!(issues = report.len(), "Union schema has validation findings");
    }

    let writer = CsvWriter::new().with_config(request.csv.clone());
    write_union_schema(&writer, &request.output, &unification.schema)
        .map_err(|e| Error::file("write", &request.output, e))?;

    info!(
        output = %request.output.display(),
        rows = unification.schema.len(),
        unmapped = unification.unmapped.len(),
        issues = report.len(),
        "Rebuilt union schema"
    );

    Ok(RebuildOutcome {
        schema: SchemaSnapshot::from_schema(unification.schema),
        report,
        unmapped: unification.unmapped,
        skipped_cross_references: unification.skipped_cross_references,
        output: request.output.clone(),
    })
}

fn read_input(reader: &CsvReader, path: &Path) -> Result<StringTable> {
    reader.read_table(path).map_err(|e| Error::file("read", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_request_builder() {
        let request = RebuildRequest::new("ik.csv", "ok.csv", "map.csv", "out.csv")
            .with_unifier_config(UnifierConfig::new().ik_aliases(["left"]))
            .with_csv_config(CsvConfig::new().write_bom(false));
        assert_eq!(request.unifier.ik_aliases, vec!["left".to_string()]);
        assert!(!request.csv.write_bom);
        assert_eq!(request.output, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_missing_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let request = RebuildRequest::new(
            dir.path().join("codeSchema_IK.csv"),
            dir.path().join("codeSchema_OK.csv"),
            dir.path().join("Cross_Map.csv"),
            dir.path().join("union_schema.csv"),
        );
        let err = rebuild(&request).unwrap_err();
        assert!(err.to_string().contains("codeSchema_IK.csv"), "{err}");
        assert!(!dir.path().join("union_schema.csv").exists());
    }

    #[test]
    fn test_outcome_summary_lists_unmapped_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let header = "part_type,pos_from,pos_to,attr_name,lookup_table\n";
        fs::write(dir.path().join("ik.csv"), format!("{header}V111,5,5,material_code,material_lookup\n")).unwrap();
        fs::write(dir.path().join("ok.csv"), header).unwrap();
        fs::write(dir.path().join("map.csv"), "ik_part_type,ok_part_type\nV111,2655\n,2656\n").unwrap();

        let request = RebuildRequest::new(
            dir.path().join("ik.csv"),
            dir.path().join("ok.csv"),
            dir.path().join("map.csv"),
            dir.path().join("out.csv"),
        );
        let outcome = rebuild(&request).unwrap();
        assert_eq!(outcome.unmapped.len(), 1);
        assert_eq!(outcome.skipped_cross_references, 1);
        let summary = outcome.to_string();
        assert!(summary.contains("warning: pair V111_2655 has no schema rows on OK"), "{summary}");
        assert!(summary.contains("1 cross-reference rows skipped"), "{summary}");
    }
}
