//! Uniform in-memory representation of a coverage profile and of the
//! package/file hierarchy that analysis builds from it.

use serde::Serialize;

/// Integer coverage percentage, reporting 100 when there is nothing to cover.
#[must_use]
pub fn percent(covered: u64, total: u64) -> u64 {
    if total == 0 {
        100
    } else {
        covered * 100 / total
    }
}

/// A contiguous section of source code, as identified by the profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CodeRange {
    /// Path in the form `PACKAGE_PATH/FILE_NAME`, where `PACKAGE_PATH` is the
    /// import path of the package under test.
    pub file_path: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl CodeRange {
    /// Split `github.com/a/b/c/d.go` into `github.com/a/b/c` and `d.go`.
    ///
    /// A path without any `/` has an empty package path.
    #[must_use]
    pub fn package_path_and_file_name(&self) -> (&str, &str) {
        match self.file_path.rfind('/') {
            Some(pos) => (&self.file_path[..pos], &self.file_path[pos + 1..]),
            None => ("", &self.file_path),
        }
    }
}

/// A single item of a coverage profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRecord {
    pub range: CodeRange,
    /// Number of statements compiled in the range.
    pub statement_count: u32,
    /// 0/1 in `set` mode, an execution count in `count` and `atomic` modes.
    pub coverage_count: u64,
}

impl CoverageRecord {
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.coverage_count > 0
    }
}

/// The complete content of a coverage profile, exactly as parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// `set`, `count` or `atomic`; empty if the profile had no mode line.
    pub mode: String,
    /// Records in file order, duplicates included.
    pub records: Vec<CoverageRecord>,
}

impl Profile {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            records: Vec::new(),
        }
    }
}

/// A code range that had no coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UncoveredBlock {
    pub range: CodeRange,
    /// Source lines from `start_line` to `end_line`, only when excerpts were
    /// requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
}

/// File-level information in an [`AnalyzerResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileResult {
    /// Simple file name, without the package path.
    pub file_name: String,
    pub total_statements: u64,
    pub covered_statements: u64,
    /// Sorted by ascending start line. Excludes code-skipped blocks.
    pub uncovered_blocks: Vec<UncoveredBlock>,
}

impl FileResult {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }
}

/// Package-level information in an [`AnalyzerResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageResult {
    /// Path within the scope: `""` for the scope package itself, `a/b` for
    /// `SCOPE/a/b`.
    pub relative_path: String,
    /// Files in encounter order. Excludes file-skipped files.
    pub files: Vec<FileResult>,
}

impl PackageResult {
    pub fn new(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            files: Vec::new(),
        }
    }
}

/// The result of one analysis pass over a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerResult {
    /// Analyzed packages, ascending by relative path. Packages whose files
    /// were all file-skipped are absent.
    pub packages: Vec<PackageResult>,
    /// Full profile paths of file-skipped blocks, one entry per block.
    pub skipped_file_paths: Vec<String>,
    /// Every block skipped by either the file or the code pattern.
    pub skipped_blocks: Vec<CoverageRecord>,
}

impl AnalyzerResult {
    /// All uncovered blocks, in package then file then line order.
    pub fn uncovered_blocks(&self) -> impl Iterator<Item = &UncoveredBlock> {
        self.packages
            .iter()
            .flat_map(|p| p.files.iter())
            .flat_map(|f| f.uncovered_blocks.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(path: &str) -> CodeRange {
        CodeRange {
            file_path: path.to_string(),
            start_line: 1,
            start_column: 1,
            end_line: 2,
            end_column: 1,
        }
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(3, 5), 60);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn test_package_path_and_file_name() {
        let r = range("github.com/a/b/c/d.go");
        assert_eq!(r.package_path_and_file_name(), ("github.com/a/b/c", "d.go"));

        let r = range("noslash.go");
        assert_eq!(r.package_path_and_file_name(), ("", "noslash.go"));
    }

    #[test]
    fn test_uncovered_blocks_order() {
        let block = |path: &str| UncoveredBlock {
            range: range(path),
            text: None,
        };
        let mut f1 = FileResult::new("a");
        f1.uncovered_blocks.push(block("p/a"));
        let mut f2 = FileResult::new("b");
        f2.uncovered_blocks.push(block("p/b"));
        let mut f3 = FileResult::new("a");
        f3.uncovered_blocks.push(block("p/q/a"));

        let result = AnalyzerResult {
            packages: vec![
                PackageResult {
                    relative_path: String::new(),
                    files: vec![f1, f2],
                },
                PackageResult {
                    relative_path: "q".to_string(),
                    files: vec![f3],
                },
            ],
            ..Default::default()
        };

        let paths: Vec<&str> = result
            .uncovered_blocks()
            .map(|b| b.range.file_path.as_str())
            .collect();
        assert_eq!(paths, vec!["p/a", "p/b", "p/q/a"]);
    }
}
