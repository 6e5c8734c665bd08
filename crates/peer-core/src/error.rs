use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the relay peer calculator.
#[derive(Error, Debug)]
pub enum PeerError {
    /// The input directory could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid delimited text.
    #[error("Failed to decode CSV {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A data row does not have the same number of fields as the header.
    #[error("Row {row} has {found} fields, header has {expected}")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The output file could not be created.
    #[error("Failed to write to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be written to the output file.
    #[error("Failed to encode CSV {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A month filter string is not of the form `YYYY-MM`.
    #[error("Invalid period: {0} (expected YYYY-MM)")]
    InvalidPeriod(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON configuration file could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PeerError {
    /// Whether this error must abort the run.
    ///
    /// Per-file problems (read, decode, shape) only skip the offending input.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PeerError::FileRead { .. } | PeerError::Decode { .. } | PeerError::ShapeMismatch { .. }
        )
    }
}

/// Convenience alias used throughout the peer crates.
pub type Result<T> = std::result::Result<T, PeerError>;
