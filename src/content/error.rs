//! Content errors

use std::path::PathBuf;
use thiserror::Error;

/// Why a front-matter block could not be turned into metadata
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("no front-matter block found")]
    Missing,

    #[error("front-matter block is not terminated")]
    Unterminated,

    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
}

/// Errors raised while reading the content store
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed entry {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
}
