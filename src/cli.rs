//! Command-line surface and the top-level run of the tool.
//!
//! [`run`] returns its output as a `String` plus the pass/fail verdict, so it
//! can be tested without capturing stdout.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use regex::Regex;
use tracing::info;

use crate::analyze::{analyze, AnalyzeOptions};
use crate::profile;
use crate::report::{JsonFormatter, ReportFormatter, SummaryReport, TextFormatter};
use crate::scope;

/// Output style for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Style {
    Text,
    Json,
}

/// covgate: fail the build when a Go coverage profile has uncovered blocks.
#[derive(Debug, Parser)]
#[command(name = "covgate", version, about)]
pub struct Cli {
    /// Coverage profile produced by `go test -coverprofile`.
    pub profile: PathBuf,

    /// Base import path of the package (default: inferred from go.mod or git).
    #[arg(long, env = "COVGATE_PACKAGE")]
    pub package: Option<String>,

    /// Regex for scope-relative file paths to ignore.
    #[arg(long, value_parser = parse_regex)]
    pub skip_files: Option<Regex>,

    /// Regex for source lines whose uncovered block should be ignored.
    #[arg(long, value_parser = parse_regex)]
    pub skip_code: Option<Regex>,

    /// Display the source code of uncovered blocks.
    #[arg(long)]
    pub show_code: bool,

    /// Save the filtered coverage profile to this path.
    #[arg(long)]
    pub out_profile: Option<PathBuf>,

    /// Show coverage statistics for each package.
    #[arg(long)]
    pub package_stats: bool,

    /// Show coverage statistics for each file.
    #[arg(long)]
    pub file_stats: bool,

    /// Report output style.
    #[arg(long, value_enum, default_value_t = Style::Text)]
    pub format: Style,

    /// Directory that package-relative source paths are resolved against.
    #[arg(long, default_value = ".")]
    pub source_root: PathBuf,

    /// Log debug details to stderr.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_regex(s: &str) -> std::result::Result<Regex, String> {
    Regex::new(s).map_err(|e| format!("Not a valid regular expression: {s} ({e})"))
}

/// What a run produced.
#[derive(Debug)]
pub struct Outcome {
    /// Rendered report, ready for stdout.
    pub output: String,
    /// True when no uncovered blocks remain after filtering.
    pub pass: bool,
}

/// Read the profile, analyze it, render the report and optionally write the
/// filtered profile.
pub fn run(cli: &Cli) -> Result<Outcome> {
    let package_path = match &cli.package {
        Some(p) => p.clone(),
        None => scope::infer_package_path(&cli.source_root)
            .context("Unable to determine package path; use --package option")?,
    };

    let file = File::open(&cli.profile)
        .with_context(|| format!("Unable to read {}", cli.profile.display()))?;
    let profile = profile::parse_reader(&mut BufReader::new(file))
        .with_context(|| format!("Error reading profile {}", cli.profile.display()))?;

    let opts = AnalyzeOptions {
        package_path: package_path.clone(),
        skip_files: cli.skip_files.clone(),
        skip_code: cli.skip_code.clone(),
        show_code: cli.show_code,
        source_root: cli.source_root.clone(),
    };
    let result = analyze(&profile, &opts)?;

    let report = SummaryReport::new(&result, &package_path);
    let mut output = match cli.format {
        Style::Text => report.format(&TextFormatter {
            package_stats: cli.package_stats,
            file_stats: cli.file_stats,
            show_code: cli.show_code,
        })?,
        Style::Json => JsonFormatter.format(&report)?,
    };

    if let Some(out_path) = &cli.out_profile {
        let mut out = File::create(out_path)
            .with_context(|| format!("Unable to create {}", out_path.display()))?;
        result.write_filtered_profile(&profile, &mut out)?;
        info!(path = %out_path.display(), "wrote filtered profile");
        if cli.format == Style::Text {
            output.push_str(&format!("Filtered profile written to {}\n", out_path.display()));
        }
    }

    Ok(Outcome {
        output,
        pass: report.pass,
    })
}
