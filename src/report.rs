//! Summary of an analysis pass and its output formatting.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::model::{percent, AnalyzerResult, UncoveredBlock};

/// Statement counts for a package or a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    pub total_statements: u64,
    pub covered_statements: u64,
}

impl Coverage {
    #[must_use]
    pub fn new(total_statements: u64, covered_statements: u64) -> Self {
        Self {
            total_statements,
            covered_statements,
        }
    }

    /// Integer percentage; 100 when there are no statements.
    #[must_use]
    pub fn percent(&self) -> u64 {
        percent(self.covered_statements, self.total_statements)
    }
}

impl Serialize for Coverage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Coverage", 3)?;
        s.serialize_field("total_statements", &self.total_statements)?;
        s.serialize_field("covered_statements", &self.covered_statements)?;
        s.serialize_field("percent", &self.percent())?;
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryFile {
    pub file_name: String,
    pub coverage: Coverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryPackage {
    /// The scope path, or `scope/relative` for nested packages.
    pub full_package_path: String,
    pub files: Vec<SummaryFile>,
    /// Sum over `files`.
    pub coverage: Coverage,
}

/// An [`AnalyzerResult`] reshaped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    /// Ascending by full package path.
    pub packages: Vec<SummaryPackage>,
    pub uncovered_blocks: Vec<UncoveredBlock>,
    /// True when no uncovered blocks remain.
    pub pass: bool,
}

impl SummaryReport {
    #[must_use]
    pub fn new(result: &AnalyzerResult, package_path: &str) -> Self {
        let scope = package_path.trim_end_matches('/');
        let mut packages = Vec::with_capacity(result.packages.len());
        let mut uncovered_blocks = Vec::new();

        for p in &result.packages {
            let full_package_path = if p.relative_path.is_empty() {
                scope.to_string()
            } else {
                format!("{}/{}", scope, p.relative_path)
            };

            let mut coverage = Coverage::default();
            let mut files = Vec::with_capacity(p.files.len());
            for f in &p.files {
                coverage.total_statements += f.total_statements;
                coverage.covered_statements += f.covered_statements;
                files.push(SummaryFile {
                    file_name: f.file_name.clone(),
                    coverage: Coverage::new(f.total_statements, f.covered_statements),
                });
                uncovered_blocks.extend(f.uncovered_blocks.iter().cloned());
            }

            packages.push(SummaryPackage {
                full_package_path,
                files,
                coverage,
            });
        }

        packages.sort_by(|a, b| a.full_package_path.cmp(&b.full_package_path));
        let pass = uncovered_blocks.is_empty();
        Self {
            packages,
            uncovered_blocks,
            pass,
        }
    }

    /// Format using a specific formatter.
    pub fn format(&self, formatter: &dyn ReportFormatter) -> Result<String> {
        formatter.format(self)
    }
}

/// Trait for formatting summary reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &SummaryReport) -> Result<String>;
}

/// Plain text formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter {
    pub package_stats: bool,
    pub file_stats: bool,
    pub show_code: bool,
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &SummaryReport) -> Result<String> {
        let mut out = String::new();

        if self.package_stats || self.file_stats {
            let mut rows: Vec<(String, Coverage)> = Vec::new();
            for p in &report.packages {
                if self.package_stats {
                    rows.push((p.full_package_path.clone(), p.coverage));
                }
                if self.file_stats {
                    for f in &p.files {
                        let desc = if self.package_stats {
                            format!("  {}", f.file_name)
                        } else {
                            format!("{}/{}", p.full_package_path, f.file_name)
                        };
                        rows.push((desc, f.coverage));
                    }
                }
            }
            out.push_str(&format_stats_table(&rows));
            out.push('\n');
        }

        if report.pass {
            out.push_str("Coverage scan passes!\n");
            return Ok(out);
        }

        out.push_str("Uncovered blocks detected:\n");
        for b in &report.uncovered_blocks {
            if self.show_code {
                out.push('\n');
            }
            let r = &b.range;
            out.push_str(&format!("{} {}-{}\n", r.file_path, r.start_line, r.end_line));
            if let (true, Some(text)) = (self.show_code, &b.text) {
                for (line_number, line) in (r.start_line..).zip(text) {
                    out.push_str(&format!("{line_number}>\t{line}\n"));
                }
            }
        }

        Ok(out)
    }
}

/// Left-aligned `NAME  covered/total  (P%)` rows.
fn format_stats_table(rows: &[(String, Coverage)]) -> String {
    let ratios: Vec<String> = rows
        .iter()
        .map(|(_, c)| format!("{}/{}", c.covered_statements, c.total_statements))
        .collect();
    let name_width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let ratio_width = ratios.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    for ((name, coverage), ratio) in rows.iter().zip(&ratios) {
        out.push_str(&format!(
            "{name:<name_width$} {ratio:<ratio_width$} ({}%)\n",
            coverage.percent()
        ));
    }
    out
}

/// JSON formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &SummaryReport) -> Result<String> {
        let mut out = serde_json::to_string_pretty(report)?;
        out.push('\n');
        Ok(out)
    }
}
