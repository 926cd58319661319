//! Reduction of repeated profile records to one record per code range.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{CodeRange, CoverageRecord, Profile};

impl Profile {
    /// Sorted, deduplicated view of the profile's records. See [`unique_blocks`].
    #[must_use]
    pub fn unique_blocks(&self) -> Vec<CoverageRecord> {
        unique_blocks(&self.records)
    }
}

/// Return one record per distinct code range, sorted by package path, file
/// name and start line.
///
/// `go test` emits a line per traced path, so a range can repeat with
/// different counts. The last record with a nonzero count wins; a range with
/// no nonzero count keeps its first record.
pub fn unique_blocks(records: &[CoverageRecord]) -> Vec<CoverageRecord> {
    let mut index: HashMap<&CodeRange, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<CoverageRecord> = Vec::new();

    for record in records {
        match index.get(&record.range) {
            Some(&i) => {
                if record.is_covered() {
                    unique[i] = record.clone();
                }
            }
            None => {
                index.insert(&record.range, unique.len());
                unique.push(record.clone());
            }
        }
    }

    // Stable sort: ranges that tie on all three keys keep first-seen order.
    unique.sort_by(|a, b| {
        let (pkg_a, file_a) = a.range.package_path_and_file_name();
        let (pkg_b, file_b) = b.range.package_path_and_file_name();
        pkg_a
            .cmp(pkg_b)
            .then_with(|| file_a.cmp(file_b))
            .then_with(|| a.range.start_line.cmp(&b.range.start_line))
    });

    debug!(
        records = records.len(),
        unique = unique.len(),
        "deduplicated coverage records"
    );
    unique
}
