use std::path::PathBuf;

use covgate::analyze::AnalyzeOptions;
use covgate::model::Profile;

pub const PACKAGE_PATH: &str = "base-package";

/// Parse `tests/fixtures/basic.coverprofile`.
pub fn basic_profile() -> Profile {
    let input = include_bytes!("../fixtures/basic.coverprofile");
    covgate::profile::parse(input).unwrap()
}

/// Directory holding the sources that the basic profile refers to.
pub fn fixture_sources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/src")
}

/// Options for the basic profile with sources resolved against the fixtures.
pub fn base_options() -> AnalyzeOptions {
    let mut opts = AnalyzeOptions::new(PACKAGE_PATH);
    opts.source_root = fixture_sources();
    opts
}
