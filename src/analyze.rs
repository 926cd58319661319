//! Grouping of deduplicated profile blocks into the package/file hierarchy,
//! applying the package scope and the skip patterns.

use std::path::PathBuf;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{CovgateError, Result};
use crate::model::{AnalyzerResult, FileResult, PackageResult, Profile, UncoveredBlock};
use crate::source::SourceReader;

/// Inputs to [`analyze`] besides the profile itself.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Import path that every profiled file must live under.
    pub package_path: String,
    /// Matched against the scope-relative file path.
    pub skip_files: Option<Regex>,
    /// Matched against each source line of an uncovered block.
    pub skip_code: Option<Regex>,
    /// Attach source excerpts to uncovered blocks.
    pub show_code: bool,
    /// Directory that scope-relative file paths are resolved against.
    pub source_root: PathBuf,
}

impl AnalyzeOptions {
    pub fn new(package_path: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            skip_files: None,
            skip_code: None,
            show_code: false,
            source_root: PathBuf::from("."),
        }
    }
}

/// Apply the options to the profile to produce report data.
///
/// Fails on the first block outside the package scope, and on the first source
/// file that cannot be read when an excerpt is needed.
pub fn analyze(profile: &Profile, opts: &AnalyzeOptions) -> Result<AnalyzerResult> {
    let scope = opts.package_path.trim_end_matches('/');
    let needs_source = opts.show_code || opts.skip_code.is_some();
    let mut source = SourceReader::new(&opts.source_root);

    let mut result = AnalyzerResult::default();
    let mut grouper = Grouper::default();

    for block in profile.unique_blocks() {
        let (package_path, file_name) = block.range.package_path_and_file_name();

        let relative_package_path = if package_path == scope {
            ""
        } else {
            package_path
                .strip_prefix(scope)
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or_else(|| CovgateError::ScopeMismatch {
                    scope: opts.package_path.clone(),
                })?
        };
        let file_path = if relative_package_path.is_empty() {
            file_name.to_string()
        } else {
            format!("{relative_package_path}/{file_name}")
        };

        if opts
            .skip_files
            .as_ref()
            .is_some_and(|re| re.is_match(&file_path))
        {
            debug!(path = %file_path, line = block.range.start_line, "skipping block by file pattern");
            result
                .skipped_file_paths
                .push(block.range.file_path.clone());
            result.skipped_blocks.push(block);
            continue;
        }

        let file = grouper.file_mut(relative_package_path, file_name);

        if block.is_covered() {
            file.total_statements += u64::from(block.statement_count);
            file.covered_statements += u64::from(block.statement_count);
            continue;
        }

        let mut text = None;
        if needs_source {
            let lines = source.lines(&file_path, block.range.start_line, block.range.end_line)?;

            if let Some(re) = &opts.skip_code {
                if lines.iter().any(|line| re.is_match(line)) {
                    debug!(path = %file_path, line = block.range.start_line, "skipping block by code pattern");
                    result.skipped_blocks.push(block);
                    continue;
                }
            }

            if opts.show_code {
                text = Some(lines);
            }
        }

        file.total_statements += u64::from(block.statement_count);
        file.uncovered_blocks.push(UncoveredBlock {
            range: block.range,
            text,
        });
    }

    result.packages = grouper.finish();

    info!(
        packages = result.packages.len(),
        skipped_blocks = result.skipped_blocks.len(),
        uncovered_blocks = result.uncovered_blocks().count(),
        "analyzed coverage profile"
    );
    Ok(result)
}

/// Open package and file accumulators. Blocks are sorted, so each package's
/// and each file's blocks are contiguous; a key change closes the previous
/// accumulator.
#[derive(Default)]
struct Grouper {
    packages: Vec<PackageResult>,
    package: Option<PackageResult>,
    file: Option<FileResult>,
}

impl Grouper {
    fn file_mut(&mut self, relative_package_path: &str, file_name: &str) -> &mut FileResult {
        if self
            .package
            .as_ref()
            .is_some_and(|p| p.relative_path != relative_package_path)
        {
            self.close_package();
        }
        if self.file.as_ref().is_some_and(|f| f.file_name != file_name) {
            self.close_file();
        }
        self.package
            .get_or_insert_with(|| PackageResult::new(relative_package_path));
        self.file.get_or_insert_with(|| FileResult::new(file_name))
    }

    fn close_file(&mut self) {
        if let (Some(file), Some(package)) = (self.file.take(), self.package.as_mut()) {
            package.files.push(file);
        }
    }

    fn close_package(&mut self) {
        self.close_file();
        if let Some(package) = self.package.take() {
            self.packages.push(package);
        }
    }

    fn finish(mut self) -> Vec<PackageResult> {
        self.close_package();
        self.packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeRange, CoverageRecord};

    fn record(path: &str, start_line: u32, end_line: u32, stmts: u32, count: u64) -> CoverageRecord {
        CoverageRecord {
            range: CodeRange {
                file_path: path.to_string(),
                start_line,
                start_column: 1,
                end_line,
                end_column: 1,
            },
            statement_count: stmts,
            coverage_count: count,
        }
    }

    fn profile(records: Vec<CoverageRecord>) -> Profile {
        Profile {
            mode: "set".to_string(),
            records,
        }
    }

    #[test]
    fn test_end_to_end_single_file() {
        let p = profile(vec![
            record("base-package/first", 1, 2, 2, 0),
            record("base-package/first", 3, 4, 1, 1),
        ]);
        let result = analyze(&p, &AnalyzeOptions::new("base-package")).unwrap();

        assert_eq!(result.packages.len(), 1);
        let package = &result.packages[0];
        assert_eq!(package.relative_path, "");
        assert_eq!(package.files.len(), 1);

        let file = &package.files[0];
        assert_eq!(file.file_name, "first");
        assert_eq!(file.total_statements, 3);
        assert_eq!(file.covered_statements, 1);
        assert_eq!(file.uncovered_blocks.len(), 1);
        assert_eq!(file.uncovered_blocks[0].range.start_line, 1);
        assert_eq!(file.uncovered_blocks[0].range.end_line, 2);
        assert_eq!(file.uncovered_blocks[0].text, None);
    }

    #[test]
    fn test_statement_accounting() {
        let p = profile(vec![
            record("scope/f.go", 1, 2, 3, 1),
            record("scope/f.go", 4, 5, 2, 0),
        ]);
        let result = analyze(&p, &AnalyzeOptions::new("scope")).unwrap();
        let file = &result.packages[0].files[0];
        assert_eq!(file.total_statements, 5);
        assert_eq!(file.covered_statements, 3);
        assert_eq!(
            crate::model::percent(file.covered_statements, file.total_statements),
            60
        );
    }

    #[test]
    fn test_groups_packages_and_files() {
        let p = profile(vec![
            record("scope/sub/b.go", 1, 1, 1, 0),
            record("scope/b.go", 1, 1, 1, 1),
            record("scope/a.go", 1, 1, 1, 0),
            record("scope/sub/a.go", 1, 1, 1, 0),
            record("scope/a.go", 5, 6, 1, 0),
        ]);
        let result = analyze(&p, &AnalyzeOptions::new("scope")).unwrap();

        let shape: Vec<(&str, Vec<&str>)> = result
            .packages
            .iter()
            .map(|p| {
                (
                    p.relative_path.as_str(),
                    p.files.iter().map(|f| f.file_name.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(
            shape,
            vec![("", vec!["a.go", "b.go"]), ("sub", vec!["a.go", "b.go"])]
        );
        let starts: Vec<u32> = result.packages[0].files[0]
            .uncovered_blocks
            .iter()
            .map(|b| b.range.start_line)
            .collect();
        assert_eq!(starts, vec![1, 5]);
    }

    #[test]
    fn test_same_file_name_in_consecutive_packages() {
        let p = profile(vec![
            record("scope/first", 1, 1, 1, 0),
            record("scope/other/first", 1, 1, 1, 0),
        ]);
        let result = analyze(&p, &AnalyzeOptions::new("scope")).unwrap();
        assert_eq!(result.packages.len(), 2);
        assert_eq!(result.packages[0].files.len(), 1);
        assert_eq!(result.packages[1].files.len(), 1);
        assert_eq!(
            result.packages[1].files[0].uncovered_blocks[0].range.file_path,
            "scope/other/first"
        );
    }

    #[test]
    fn test_scope_mismatch() {
        let p = profile(vec![
            record("scope/a.go", 1, 1, 1, 0),
            record("elsewhere/a.go", 1, 1, 1, 0),
        ]);
        match analyze(&p, &AnalyzeOptions::new("scope")) {
            Err(CovgateError::ScopeMismatch { scope }) => assert_eq!(scope, "scope"),
            other => panic!("expected ScopeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_scope_must_match_whole_segment() {
        let p = profile(vec![record("scope-extra/a.go", 1, 1, 1, 0)]);
        assert!(matches!(
            analyze(&p, &AnalyzeOptions::new("scope")),
            Err(CovgateError::ScopeMismatch { .. })
        ));
    }

    #[test]
    fn test_scope_trailing_slash() {
        let p = profile(vec![record("scope/sub/a.go", 1, 1, 1, 0)]);
        let result = analyze(&p, &AnalyzeOptions::new("scope/")).unwrap();
        assert_eq!(result.packages[0].relative_path, "sub");
    }

    #[test]
    fn test_skip_files() {
        let p = profile(vec![
            record("scope/a.go", 1, 1, 1, 0),
            record("scope/gen/a_generated.go", 1, 1, 4, 0),
            record("scope/gen/a_generated.go", 3, 4, 2, 1),
        ]);
        let mut opts = AnalyzeOptions::new("scope");
        opts.skip_files = Some(Regex::new("_generated").unwrap());
        let result = analyze(&p, &opts).unwrap();

        assert_eq!(result.packages.len(), 1);
        assert_eq!(result.packages[0].relative_path, "");
        assert_eq!(
            result.skipped_file_paths,
            vec!["scope/gen/a_generated.go", "scope/gen/a_generated.go"]
        );
        assert_eq!(result.skipped_blocks.len(), 2);
    }

    #[test]
    fn test_skip_files_matches_scope_relative_path() {
        let p = profile(vec![record("scope/a.go", 1, 1, 1, 0)]);
        let mut opts = AnalyzeOptions::new("scope");
        opts.skip_files = Some(Regex::new("^scope/").unwrap());
        let result = analyze(&p, &opts).unwrap();
        assert!(result.skipped_blocks.is_empty());
        assert_eq!(result.uncovered_blocks().count(), 1);
    }

    #[test]
    fn test_empty_profile() {
        let result = analyze(&Profile::default(), &AnalyzeOptions::new("scope")).unwrap();
        assert_eq!(result, AnalyzerResult::default());
    }
}
