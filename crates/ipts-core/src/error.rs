use std::path::PathBuf;
use thiserror::Error;

/// Failures while locating or loading a filter profile
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("profile '{0}' not found")]
    NotFound(String),
}
