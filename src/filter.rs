//! Projection of the original profile onto the records that analysis did not
//! skip, for re-export.

use std::collections::HashSet;
use std::io::Write;

use tracing::debug;

use crate::error::Result;
use crate::model::{AnalyzerResult, CodeRange, CoverageRecord, Profile};

impl Profile {
    /// Copy of this profile keeping only the records for which `retain`
    /// returns true. Mode and record order are preserved.
    #[must_use]
    pub fn with_record_filter(&self, mut retain: impl FnMut(&CoverageRecord) -> bool) -> Profile {
        Profile {
            mode: self.mode.clone(),
            records: self
                .records
                .iter()
                .filter(|r| retain(*r))
                .cloned()
                .collect(),
        }
    }
}

impl AnalyzerResult {
    /// The original profile without the records this analysis skipped.
    ///
    /// Duplicate records of retained ranges are kept as they were, so the
    /// result is not deduplicated.
    #[must_use]
    pub fn filter_profile(&self, original: &Profile) -> Profile {
        let skipped_ranges: HashSet<&CodeRange> =
            self.skipped_blocks.iter().map(|b| &b.range).collect();
        let skipped_files: HashSet<&str> =
            self.skipped_file_paths.iter().map(String::as_str).collect();

        let filtered = original.with_record_filter(|r| {
            !skipped_files.contains(r.range.file_path.as_str()) && !skipped_ranges.contains(&r.range)
        });
        debug!(
            original = original.records.len(),
            retained = filtered.records.len(),
            "filtered coverage profile"
        );
        filtered
    }

    /// Write [`Self::filter_profile`] in profile format.
    pub fn write_filtered_profile(&self, original: &Profile, writer: &mut dyn Write) -> Result<()> {
        self.filter_profile(original).write_to(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{analyze, AnalyzeOptions};
    use crate::profile;
    use regex::Regex;

    const INPUT: &[u8] = b"mode: count\n\
        scope/a.go:1.1,2.1 1 0\n\
        scope/skip_me.go:1.1,2.1 2 0\n\
        scope/a.go:1.1,2.1 1 3\n\
        scope/a.go:4.1,5.1 1 0\n\
        scope/skip_me.go:4.1,5.1 2 1\n";

    #[test]
    fn test_with_record_filter() {
        let p = profile::parse(INPUT).unwrap();
        let filtered = p.with_record_filter(|r| r.coverage_count == 0);
        assert_eq!(filtered.mode, "count");
        assert_eq!(filtered.records.len(), 3);
    }

    #[test]
    fn test_filter_profile_drops_skipped_files() {
        let p = profile::parse(INPUT).unwrap();
        let mut opts = AnalyzeOptions::new("scope");
        opts.skip_files = Some(Regex::new("skip_me").unwrap());
        let result = analyze(&p, &opts).unwrap();

        let filtered = result.filter_profile(&p);
        assert_eq!(filtered.mode, "count");
        let expected: Vec<CoverageRecord> = p
            .records
            .iter()
            .filter(|r| r.range.file_path == "scope/a.go")
            .cloned()
            .collect();
        assert_eq!(filtered.records, expected);
    }

    #[test]
    fn test_filter_profile_without_skips_is_identity() {
        let p = profile::parse(INPUT).unwrap();
        let result = analyze(&p, &AnalyzeOptions::new("scope")).unwrap();
        assert_eq!(result.filter_profile(&p), p);
    }

    #[test]
    fn test_filtered_profile_round_trips() {
        let p = profile::parse(INPUT).unwrap();
        let mut opts = AnalyzeOptions::new("scope");
        opts.skip_files = Some(Regex::new("skip_me").unwrap());
        let result = analyze(&p, &opts).unwrap();

        let mut out = Vec::new();
        result.write_filtered_profile(&p, &mut out).unwrap();
        let reparsed = profile::parse(&out).unwrap();

        assert_eq!(reparsed, result.filter_profile(&p));
        assert_eq!(reparsed.records.len(), 3);
    }
}
