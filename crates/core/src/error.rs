use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Run-level failures. Only these may stop an import, and only before any file is processed.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{0}: is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error("directory walker failed: {0}")]
    Walker(String),
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("date value {0:?} does not match YYYY:MM:DD HH:MM:SS")]
    InvalidDate(String),
    #[error("cannot hash {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot copy {from} -> {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("copied, but cannot remove source {path}: {source}")]
    RemoveSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
