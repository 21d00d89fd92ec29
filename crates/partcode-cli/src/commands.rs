//! Command implementations
//!
//! Results go to stdout, as text or with `--json` as one JSON document.
//! Warnings go to stderr.

use crate::config::CliConfig;
use anyhow::{Context, Result, bail};
use partcode_adapter_csv::{CsvReader, MatchedParts, load_lookup_dir, load_matched_parts};
use partcode_codec::{CodecEngine, Decoded, Encoded, InputPlan};
use partcode_pipeline::{RebuildRequest, SchemaSnapshot, rebuild};
use partcode_schema::{Attributes, Side};
use partcode_validation::{IssueCategory, LookupRegistry, ValidationEngine, ValidationReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct EncodeArgs {
    pub pair_id: String,
    pub sides: &'static [Side],
    pub attrs: Attributes,
    pub prefix: Option<String>,
    pub fill: Option<char>,
    pub strict: bool,
    pub lookup_dir: Option<PathBuf>,
    pub matched_parts: Option<PathBuf>,
    pub union: Option<PathBuf>,
}

pub struct DecodeArgs {
    pub code: String,
    pub side: Side,
    pub pair: Option<String>,
    pub lookup_dir: Option<PathBuf>,
    pub union: Option<PathBuf>,
}

#[derive(Serialize)]
struct BuildSummary<'a> {
    output: &'a Path,
    rows: usize,
    pairs: usize,
    issues: BTreeMap<IssueCategory, usize>,
    unmapped: Vec<UnmappedSummary<'a>>,
    skipped_cross_references: usize,
}

#[derive(Serialize)]
struct UnmappedSummary<'a> {
    pair_id: &'a str,
    missing: &'a [Side],
}

#[derive(Serialize)]
struct EncodedSummary<'a> {
    #[serde(flatten)]
    encoded: &'a Encoded,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched: Option<MatchedSummary<'a>>,
}

/// Verified counterpart of a generated code
#[derive(Serialize)]
struct MatchedSummary<'a> {
    side: Side,
    code: &'a str,
}

#[derive(Serialize)]
struct ValidateSummary<'a> {
    union_schema: &'a Path,
    counts: BTreeMap<IssueCategory, usize>,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

#[derive(Serialize)]
struct DecodeSummary<'a> {
    #[serde(flatten)]
    decoded: &'a Decoded,
    labels: BTreeMap<&'a str, String>,
}

pub fn build(
    config: &CliConfig,
    ik: &Path,
    ok: &Path,
    cross_map: &Path,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let request = RebuildRequest::new(ik, ok, cross_map, config.union_schema(output))
        .with_unifier_config(config.unifier_config());
    let outcome = rebuild(&request).context("union schema build failed")?;

    if json {
        let summary = BuildSummary {
            output: &outcome.output,
            rows: outcome.schema.len(),
            pairs: outcome.schema.pairs().len(),
            issues: outcome.report.counts_by_category(),
            unmapped: outcome
                .unmapped
                .iter()
                .map(|entry| UnmappedSummary {
                    pair_id: &entry.pair_id,
                    missing: &entry.missing,
                })
                .collect(),
            skipped_cross_references: outcome.skipped_cross_references,
        };
        print_json(&summary)
    } else {
        println!("{outcome}");
        Ok(())
    }
}

pub fn validate(config: &CliConfig, union: Option<PathBuf>, json: bool) -> Result<()> {
    let path = config.union_schema(union);
    let snapshot = load_snapshot(&path)?;
    let report = partcode_validation::validate(&snapshot);

    if json {
        print_json(&ValidateSummary {
            union_schema: &path,
            counts: report.counts_by_category(),
            report: &report,
        })
    } else {
        println!("{report}");
        for issue in report.issues() {
            println!("  {issue}");
        }
        Ok(())
    }
}

pub fn keys(config: &CliConfig, pair_id: &str, side: Side, union: Option<PathBuf>, json: bool) -> Result<()> {
    let snapshot = load_snapshot(&config.union_schema(union))?;
    let engine = CodecEngine::new(&snapshot);
    let plan = InputPlan::new(&engine, pair_id, side)?;

    if json {
        return print_json(&plan);
    }
    println!("pair: {}", plan.pair_id);
    println!("required on {side}: {}", plan.base_keys.join(", "));
    println!("extra for {}: {}", side.other(), plan.extra_keys.join(", "));
    Ok(())
}

pub fn encode(config: &CliConfig, args: &EncodeArgs, json: bool) -> Result<()> {
    if args.prefix.is_some() && args.sides.len() > 1 {
        bail!("--prefix needs a single --side");
    }
    let snapshot = load_snapshot(&config.union_schema(args.union.clone()))?;
    let engine = CodecEngine::with_options(&snapshot, config.codec_options(args.fill));

    let base_side = args.sides.first().copied().unwrap_or(Side::Ik);
    let readiness =
        InputPlan::new(&engine, &args.pair_id, base_side)?.readiness(&engine, &args.attrs)?;
    let mut incomplete = Vec::new();
    for side in args.sides {
        let missing = readiness.missing(*side);
        if !missing.is_empty() {
            eprintln!("warning: {side} code is missing required keys: {}", missing.join(", "));
            incomplete.push(*side);
        }
    }
    if args.strict {
        if !incomplete.is_empty() {
            bail!("missing required keys for {}", sides_list(&incomplete));
        }
        if let Some(dir) = config.lookup_dir(args.lookup_dir.clone()) {
            check_lookup_codes(&snapshot, args, &load_lookups(&dir)?)?;
        }
    }

    let codes = args
        .sides
        .iter()
        .map(|side| engine.encode(*side, &args.pair_id, &args.attrs, args.prefix.as_deref()))
        .collect::<partcode_codec::Result<Vec<Encoded>>>()?;
    for encoded in &codes {
        for notice in &encoded.notices {
            eprintln!("warning: {}: {}", encoded.side, serde_json::to_string(notice)?);
        }
    }

    let matched = config
        .matched_parts(args.matched_parts.clone())
        .map(|path| load_matched(&path))
        .transpose()?;
    let summaries: Vec<EncodedSummary<'_>> = codes
        .iter()
        .map(|encoded| EncodedSummary {
            encoded,
            matched: matched
                .as_ref()
                .and_then(|parts| parts.counterpart(encoded.side, &encoded.code))
                .map(|code| MatchedSummary {
                    side: encoded.side.other(),
                    code,
                }),
        })
        .collect();

    if json {
        return print_json(&summaries);
    }
    for summary in &summaries {
        println!("{}: {}", summary.encoded.side, summary.encoded);
        if let Some(matched) = &summary.matched {
            println!("  matched {}: {}", matched.side, matched.code);
        }
    }
    Ok(())
}

pub fn decode(config: &CliConfig, args: &DecodeArgs, json: bool) -> Result<()> {
    let snapshot = load_snapshot(&config.union_schema(args.union.clone()))?;
    let engine = CodecEngine::new(&snapshot);
    let decoded = match &args.pair {
        Some(pair_id) => engine.decode_with_pair(pair_id, args.side, &args.code)?,
        None => engine.decode(args.side, &args.code)?,
    };

    let labels = match config.lookup_dir(args.lookup_dir.clone()) {
        Some(dir) => lookup_labels(&snapshot, &decoded, &load_lookups(&dir)?),
        None => BTreeMap::new(),
    };

    if json {
        return print_json(&DecodeSummary {
            decoded: &decoded,
            labels,
        });
    }
    println!("pair: {}", decoded.pair_id);
    println!("part_type: {}", decoded.part_type);
    for (key, value) in &decoded.attrs {
        match labels.get(key.as_str()) {
            Some(label) => println!("  {key} = {value} ({label})"),
            None => println!("  {key} = {value}"),
        }
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<SchemaSnapshot> {
    let snapshot = SchemaSnapshot::load(path)
        .with_context(|| format!("cannot load union schema {}", path.display()))?;
    info!(path = %path.display(), rows = snapshot.len(), "Using union schema");
    Ok(snapshot)
}

fn load_lookups(dir: &Path) -> Result<LookupRegistry> {
    load_lookup_dir(&CsvReader::new(), dir)
        .with_context(|| format!("cannot load lookup tables from {}", dir.display()))
}

fn load_matched(path: &Path) -> Result<MatchedParts> {
    let parts = load_matched_parts(&CsvReader::new(), path)
        .with_context(|| format!("cannot load matched parts {}", path.display()))?;
    info!(path = %path.display(), pairs = parts.len(), "Using matched parts");
    Ok(parts)
}

fn check_lookup_codes(snapshot: &SchemaSnapshot, args: &EncodeArgs, registry: &LookupRegistry) -> Result<()> {
    let engine = ValidationEngine::new();
    let mut report = ValidationReport::new();
    for side in args.sides {
        report.merge(engine.validate_lookup_codes(snapshot, &args.pair_id, *side, &args.attrs, registry)?);
    }
    if report.is_clean() {
        return Ok(());
    }
    for issue in report.issues() {
        eprintln!("error: {issue}");
    }
    bail!("{} attribute values are not valid lookup codes", report.len())
}

/// Labels of lookup-typed attributes of a decoded code
fn lookup_labels<'a>(
    snapshot: &'a SchemaSnapshot,
    decoded: &Decoded,
    registry: &LookupRegistry,
) -> BTreeMap<&'a str, String> {
    snapshot
        .rows_for(&decoded.pair_id)
        .filter(|row| row.is_lookup() && !row.lookup.is_empty())
        .filter_map(|row| {
            let value = decoded.attrs.get(&row.key)?;
            let label = registry.describe(&row.lookup, decoded.side, &decoded.part_type, value);
            Some((row.key.as_str(), label))
        })
        .collect()
}

fn sides_list(sides: &[Side]) -> String {
    sides.iter().map(|side| side.as_str()).collect::<Vec<_>>().join(" and ")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
