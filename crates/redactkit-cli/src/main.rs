//! Redaction command-line tool
//!
//! # Usage
//!
//! ```bash
//! # Redact a file, keeping the map for later
//! redactkit redact notes.txt --map-out notes.map.json > notes.redacted.txt
//!
//! # Put the originals back into a model's answer
//! redactkit restore --map notes.map.json answer.txt
//!
//! # Show the detection catalog
//! redactkit patterns
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use redactkit_core::{catalog, restore, RedactionMap, RedactionOptions, RedactionResult, Redactor};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reversible PII redaction for text sent to language models
#[derive(Parser)]
#[command(name = "redactkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Redact PII from a file (or stdin) and print the redacted text
    Redact {
        /// Input file, stdin when omitted or "-"
        file: Option<PathBuf>,

        /// Skip the person-name heuristic
        #[arg(long)]
        no_names: bool,

        /// Skip the street-address heuristic
        #[arg(long)]
        no_addresses: bool,

        /// Write the redaction map as JSON to this path
        #[arg(long)]
        map_out: Option<PathBuf>,

        /// Print the whole result as JSON instead of the redacted text
        #[arg(long)]
        json: bool,
    },

    /// Restore placeholders using a saved redaction map
    Restore {
        /// Redaction map written by `redact --map-out`
        #[arg(long)]
        map: PathBuf,

        /// Input file, stdin when omitted or "-"
        file: Option<PathBuf>,
    },

    /// List detection patterns in priority order
    Patterns,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Redact {
            file,
            no_names,
            no_addresses,
            map_out,
            json,
        } => {
            let text = read_input(file.as_deref())?;
            let options = RedactionOptions::builder()
                .include_names(!no_names)
                .include_addresses(!no_addresses)
                .build();
            let result = Redactor::new().redact(&text, &options);
            info!(
                detections = result.detection_stats.total(),
                stats = %summarize(&result),
                "Redaction finished"
            );

            if let Some(path) = map_out {
                write_map(&path, &result.redaction_map)?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", result.redacted_content);
            }
        }
        Commands::Restore { map, file } => {
            let map = read_map(&map)?;
            let text = read_input(file.as_deref())?;
            print!("{}", restore(&text, &map));
        }
        Commands::Patterns => print!("{}", render_patterns()),
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn write_map(path: &Path, map: &RedactionMap) -> Result<()> {
    let json = serde_json::to_string_pretty(map)?;
    fs::write(path, json).with_context(|| format!("Failed to write map to {}", path.display()))
}

fn read_map(path: &Path) -> Result<RedactionMap> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid redaction map in {}", path.display()))
}

/// Catalog listing: priority, tag, validation and regulatory basis.
fn render_patterns() -> String {
    let mut ordered: Vec<_> = catalog::builtin_patterns().iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut out = format!("{:>8}  {:<20}  {:<9}  {}\n", "PRIORITY", "TYPE", "VALIDATED", "BASIS");
    for pattern in ordered {
        out.push_str(&format!(
            "{:>8}  {:<20}  {:<9}  {}\n",
            pattern.priority,
            pattern.pii_type.tag(),
            if pattern.validator.is_some() { "yes" } else { "no" },
            pattern.pii_type.regulatory_basis()
        ));
    }
    for pii_type in [redactkit_core::PiiType::Name, redactkit_core::PiiType::Address] {
        out.push_str(&format!(
            "{:>8}  {:<20}  {:<9}  {}\n",
            "-",
            pii_type.tag(),
            "heuristic",
            pii_type.regulatory_basis()
        ));
    }
    out
}

/// `TAG=count` pairs for logging; never includes values.
fn summarize(result: &RedactionResult) -> String {
    result
        .detection_stats
        .iter()
        .map(|(tag, count)| format!("{tag}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}
