use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovgateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid profile data format at line {line}")]
    MalformedProfile { line: usize },

    #[error(
        "coverage profile refers to source files that are not in the package \"{scope}\"; \
         use --package option to specify correct package path"
    )]
    ScopeMismatch { scope: String },

    #[error("unable to read file \"{path}\" ({source})")]
    UnreadableSource {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CovgateError>;
