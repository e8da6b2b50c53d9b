use thiserror::Error;

/// I/O failures while reading a save dump or writing restore output
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to read input at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),
}
