pub mod analyze;
pub mod cli;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod model;
pub mod profile;
pub mod report;
pub mod scope;
pub mod source;
