use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub use providers::TagSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Audio,
    DatedMedia,
    Unclassifiable,
}

/// Where a file belongs, and which naming rule put it there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Audio(PathBuf),
    Dated(PathBuf),
    Unclassifiable,
}

impl Classification {
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Classification::Audio(path) | Classification::Dated(path) => Some(path),
            Classification::Unclassifiable => None,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Classification::Audio(_) => Category::Audio,
            Classification::Dated(_) => Category::DatedMedia,
            Classification::Unclassifiable => Category::Unclassifiable,
        }
    }
}

/// Result of one file's pass through the pipeline. Produced exactly once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementOutcome {
    Copied,
    Moved,
    Skipped,
    NoMetadata,
    Failed,
}

impl PlacementOutcome {
    pub fn for_mode(mode: TransferMode) -> Self {
        match mode {
            TransferMode::Copy => PlacementOutcome::Copied,
            TransferMode::Move => PlacementOutcome::Moved,
        }
    }

    /// Copied or Moved: outcomes that only count when the filesystem was touched.
    pub fn is_transfer(self) -> bool {
        matches!(self, PlacementOutcome::Copied | PlacementOutcome::Moved)
    }
}

impl fmt::Display for PlacementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlacementOutcome::Copied => "copied",
            PlacementOutcome::Moved => "moved",
            PlacementOutcome::Skipped => "skipped",
            PlacementOutcome::NoMetadata => "no metadata",
            PlacementOutcome::Failed => "failed",
        };
        f.write_str(label)
    }
}
