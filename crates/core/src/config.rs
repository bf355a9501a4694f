use crate::hashing::HashAlgorithm;
use crate::models::TransferMode;
use crate::scanner::ScanOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// Delete the original after placing it.
    #[serde(default)]
    pub move_files: bool,
    #[serde(default)]
    pub dry_run: bool,
    /// Defaults to the host's available parallelism.
    #[serde(default)]
    pub max_procs: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    #[default]
    Native,
    Exiftool,
    /// Native first, exiftool when that fails.
    Auto,
}

impl MetadataBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataBackend::Native => "native",
            MetadataBackend::Exiftool => "exiftool",
            MetadataBackend::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default)]
    pub backend: MetadataBackend,
    #[serde(default = "default_exiftool_path")]
    pub exiftool_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            backend: MetadataBackend::default(),
            exiftool_path: default_exiftool_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MetadataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_true")]
    pub include_hidden: bool,
    #[serde(default)]
    pub hash: HashAlgorithm,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            include_hidden: true,
            hash: HashAlgorithm::default(),
        }
    }
}

fn default_exiftool_path() -> String {
    "exiftool".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

pub fn default_max_procs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Effective, immutable settings for one import run.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub from: PathBuf,
    pub to: PathBuf,
    pub mode: TransferMode,
    pub dry_run: bool,
    pub max_procs: usize,
    pub hash: HashAlgorithm,
    pub exclude: Vec<String>,
    pub include_hidden: bool,
}

impl ImportSettings {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            mode: TransferMode::Copy,
            dry_run: false,
            max_procs: default_max_procs(),
            hash: HashAlgorithm::default(),
            exclude: Vec::new(),
            include_hidden: true,
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            exclude: self.exclude.clone(),
            include_hidden: self.include_hidden,
        }
    }
}

impl AppConfig {
    /// `None` until both source and destination are known.
    pub fn settings(&self) -> Option<ImportSettings> {
        let from = self.import.from.as_deref().filter(|s| !s.is_empty())?;
        let to = self.import.to.as_deref().filter(|s| !s.is_empty())?;
        Some(ImportSettings {
            from: PathBuf::from(from),
            to: PathBuf::from(to),
            mode: if self.import.move_files {
                TransferMode::Move
            } else {
                TransferMode::Copy
            },
            dry_run: self.import.dry_run,
            max_procs: self.import.max_procs.unwrap_or_else(default_max_procs).max(1),
            hash: self.scan.hash,
            exclude: self.scan.exclude.clone(),
            include_hidden: self.scan.include_hidden,
        })
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("MEDIA_IMPORT")
            .separator("__")
            .try_parsing(true),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
