use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a run.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("cannot read membership file {}: {source}", .path.display())]
    Membership { path: PathBuf, source: io::Error },

    #[error("cannot read directory {}: {source}", .path.display())]
    Directory { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot serialize variables for {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("cannot export report to {}: {source}", .path.display())]
    Export { path: PathBuf, source: io::Error },
}

/// Why a single variable file could not be used.
#[derive(Debug, Error)]
pub enum VarFileError {
    #[error("unreadable: {0}")]
    Unreadable(#[from] io::Error),

    #[error("invalid YAML: {0}")]
    Unparsable(#[from] serde_yaml::Error),

    #[error("top-level value is a {0}, expected a mapping")]
    NotAMapping(&'static str),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
