//! Reader and writer for the Go `-coverprofile` format.
//!
//! Reference: https://go.dev/blog/cover
//!
//! Format:
//!   mode: set|count|atomic
//!   <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <count>
//!
//! Each record line describes a basic block with the number of statements in
//! it and how many times it was executed. The same block commonly appears on
//! several lines; records are kept exactly as read and merged later by
//! [`crate::dedup`].
use std::io::{BufRead, BufWriter, Write};

use regex::Regex;
use tracing::debug;

use crate::error::{CovgateError, Result};
use crate::model::{CodeRange, CoverageRecord, Profile};

const MODE_PREFIX: &str = "mode:";

/// The file path is everything before the last `:L.C,L.C N N` suffix, so
/// paths containing colons still parse.
const RECORD_PATTERN: &str = r"^(.*):(\d+)\.(\d+),(\d+)\.(\d+)\s+(\d+)\s+(\d+)$";

/// Parse a coverage profile from raw bytes.
pub fn parse(input: &[u8]) -> Result<Profile> {
    parse_reader(&mut &*input)
}

/// Parse a coverage profile from a reader.
///
/// Blank lines are skipped anywhere. A line starting with `mode:` sets the
/// coverage mode; any other line must be a record, otherwise parsing fails with
/// the 1-based line number of the offending line.
pub fn parse_reader(reader: &mut dyn BufRead) -> Result<Profile> {
    let record_re = Regex::new(RECORD_PATTERN).map_err(|e| CovgateError::Other(e.to_string()))?;
    let mut profile = Profile::default();

    let mut raw_line = String::new();
    let mut line_number = 0;
    loop {
        raw_line.clear();
        if reader.read_line(&mut raw_line)? == 0 {
            break;
        }
        line_number += 1;

        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(mode) = line.strip_prefix(MODE_PREFIX) {
            profile.mode = mode.trim().to_string();
            continue;
        }

        match parse_record_line(&record_re, line) {
            Some(record) => profile.records.push(record),
            None => return Err(CovgateError::MalformedProfile { line: line_number }),
        }
    }

    debug!(
        mode = %profile.mode,
        records = profile.records.len(),
        "parsed coverage profile"
    );
    Ok(profile)
}

/// Parse a single record line. Returns `None` if the line does not have the
/// record shape or a number does not fit.
fn parse_record_line(re: &Regex, line: &str) -> Option<CoverageRecord> {
    let caps = re.captures(line)?;
    let num = |i: usize| caps.get(i).map(|m| m.as_str());

    Some(CoverageRecord {
        range: CodeRange {
            file_path: num(1)?.to_string(),
            start_line: num(2)?.parse().ok()?,
            start_column: num(3)?.parse().ok()?,
            end_line: num(4)?.parse().ok()?,
            end_column: num(5)?.parse().ok()?,
        },
        statement_count: num(6)?.parse().ok()?,
        coverage_count: num(7)?.parse().ok()?,
    })
}

impl Profile {
    /// Write the profile in the same format it is parsed from.
    pub fn write_to(&self, writer: &mut dyn Write) -> Result<()> {
        let mut out = BufWriter::new(writer);
        writeln!(out, "{} {}", MODE_PREFIX, self.mode)?;
        for record in &self.records {
            let r = &record.range;
            writeln!(
                out,
                "{}:{}.{},{}.{} {} {}",
                r.file_path,
                r.start_line,
                r.start_column,
                r.end_line,
                r.end_column,
                record.statement_count,
                record.coverage_count,
            )?;
        }
        out.flush()?;
        Ok(())
    }
}
