//! Inference of the package scope when none is configured.
//!
//! Strategy:
//!   1. The `module` line of `go.mod` in the project directory
//!   2. The `origin` remote URL of the git checkout
use std::path::Path;
use std::process::Command;

use regex::Regex;
use tracing::debug;

/// Determine the import path of the package in `dir`, preferably from
/// `go.mod`, otherwise from git. Returns `None` if neither yields one.
pub fn infer_package_path(dir: &Path) -> Option<String> {
    if let Some(path) = from_go_mod(dir) {
        debug!(package = %path, "inferred package path from go.mod");
        return Some(path);
    }

    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let url = String::from_utf8(output.stdout).ok()?;
    let path = package_path_from_remote_url(url.trim())?;
    debug!(package = %path, "inferred package path from git remote");
    Some(path)
}

/// The module path from the first line of `go.mod`, if it is a `module` line.
fn from_go_mod(dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(dir.join("go.mod")).ok()?;
    let first = content.lines().next()?;
    let module = first.strip_prefix("module ")?.trim();
    (!module.is_empty()).then(|| module.to_string())
}

/// Map a git remote URL to a package path:
///
/// - `git@HOST:PATH.git` → `HOST/PATH`
/// - `http(s)://X.git` → `X`
/// - `ssh://git@X.git` → `X`
pub fn package_path_from_remote_url(url: &str) -> Option<String> {
    let scp = Regex::new(r"^git@(.*):(.*)\.git$").ok()?;
    if let Some(caps) = scp.captures(url) {
        return Some(format!("{}/{}", &caps[1], &caps[2]));
    }

    let patterns = [r"^https?://(.*)\.git$", r"^ssh://git@(.*)\.git$"];
    for pattern in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(caps) = re.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}
