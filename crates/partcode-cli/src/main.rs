//! # partcode-cli
//!
//! Command-line interface for the IK/OK part codes.
//!
//! Rebuilds the union schema artifact from the raw site schemas, validates
//! it, and encodes or decodes codes against it.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use config::CliConfig;
use partcode_schema::Side;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "partcode")]
#[command(about = "IK/OK part code schema builder and codec")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the union schema artifact from the raw site schemas
    Build {
        /// Raw IK schema CSV
        #[arg(long)]
        ik: PathBuf,

        /// Raw OK schema CSV
        #[arg(long)]
        ok: PathBuf,

        /// Cross-reference CSV pairing IK and OK part-types
        #[arg(long)]
        cross_map: PathBuf,

        /// Artifact to write (defaults to the configured union schema)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a union schema artifact
    Validate {
        /// Artifact path
        union: Option<PathBuf>,
    },

    /// Show the keys a side requires and the extras the other side needs
    Keys {
        pair_id: String,

        #[arg(long, value_enum)]
        side: SideArg,

        /// Artifact path
        union: Option<PathBuf>,
    },

    /// Encode attributes into one or both codes
    Encode {
        pair_id: String,

        #[arg(long, value_enum, default_value_t = Target::Both)]
        side: Target,

        /// Attribute value as key=value (repeatable)
        #[arg(short, long = "attr", value_parser = parse_attr)]
        attrs: Vec<(String, String)>,

        /// Prefix written instead of the pair's part-type
        #[arg(long)]
        prefix: Option<String>,

        /// Character for unfilled positions
        #[arg(long)]
        fill: Option<char>,

        /// Fail on missing required keys and, with a lookup directory,
        /// on unknown lookup codes
        #[arg(long)]
        strict: bool,

        /// Lookup table directory for --strict
        #[arg(long)]
        lookup_dir: Option<PathBuf>,

        /// Verified code pairs; reports the counterpart of a generated code
        #[arg(long)]
        matched_parts: Option<PathBuf>,

        /// Artifact path
        #[arg(short, long)]
        union: Option<PathBuf>,
    },

    /// Decode a code into its pair and attributes
    Decode {
        code: String,

        #[arg(long, value_enum)]
        side: SideArg,

        /// Decode against this pair instead of matching the prefix
        #[arg(long)]
        pair: Option<String>,

        /// Lookup table directory for labels
        #[arg(long)]
        lookup_dir: Option<PathBuf>,

        /// Artifact path
        #[arg(short, long)]
        union: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SideArg {
    #[value(name = "IK", alias = "ik")]
    Ik,
    #[value(name = "OK", alias = "ok")]
    Ok,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Ik => Side::Ik,
            SideArg::Ok => Side::Ok,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    #[value(name = "IK", alias = "ik")]
    Ik,
    #[value(name = "OK", alias = "ok")]
    Ok,
    #[value(name = "BOTH", alias = "both")]
    Both,
}

impl Target {
    fn sides(self) -> &'static [Side] {
        match self {
            Self::Ik => &[Side::Ik],
            Self::Ok => &[Side::Ok],
            Self::Both => &Side::ALL,
        }
    }
}

fn parse_attr(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty attribute name in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::Build {
            ik,
            ok,
            cross_map,
            output,
        } => commands::build(&config, &ik, &ok, &cross_map, output, json),
        Commands::Validate { union } => commands::validate(&config, union, json),
        Commands::Keys {
            pair_id,
            side,
            union,
        } => commands::keys(&config, &pair_id, side.into(), union, json),
        Commands::Encode {
            pair_id,
            side,
            attrs,
            prefix,
            fill,
            strict,
            lookup_dir,
            matched_parts,
            union,
        } => commands::encode(
            &config,
            &commands::EncodeArgs {
                pair_id,
                sides: side.sides(),
                attrs: attrs.into_iter().collect(),
                prefix,
                fill,
                strict,
                lookup_dir,
                matched_parts,
                union,
            },
            json,
        ),
        Commands::Decode {
            code,
            side,
            pair,
            lookup_dir,
            union,
        } => commands::decode(
            &config,
            &commands::DecodeArgs {
                code,
                side: side.into(),
                pair,
                lookup_dir,
                union,
            },
            json,
        ),
    }
}
