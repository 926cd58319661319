//! Source excerpts for uncovered blocks.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CovgateError, Result};

/// Reads line ranges from source files under a root directory.
///
/// Blocks arrive grouped by file, so only the most recently read file is
/// kept in memory.
pub struct SourceReader {
    root: PathBuf,
    cached: Option<(String, Vec<String>)>,
}

impl SourceReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cached: None,
        }
    }

    /// Lines `start..=end` (1-based) of `relative_path`. A range running past
    /// the end of the file yields only the lines that exist.
    pub fn lines(&mut self, relative_path: &str, start: u32, end: u32) -> Result<Vec<String>> {
        let hit = matches!(&self.cached, Some((path, _)) if path == relative_path);
        if !hit {
            let lines = read_all_lines(&self.root.join(relative_path)).map_err(|source| {
                CovgateError::UnreadableSource {
                    path: relative_path.to_string(),
                    source,
                }
            })?;
            debug!(path = relative_path, lines = lines.len(), "read source file");
            self.cached = Some((relative_path.to_string(), lines));
        }

        let lines = match &self.cached {
            Some((_, lines)) => lines,
            None => return Ok(Vec::new()),
        };
        let first = start.max(1) as usize - 1;
        let last = (end as usize).min(lines.len());
        if first >= last {
            return Ok(Vec::new());
        }
        Ok(lines[first..last].to_vec())
    }
}

fn read_all_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for raw in reader.split(b'\n') {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        lines.push(line.strip_suffix('\r').unwrap_or(&*line).to_string());
    }
    Ok(lines)
}
