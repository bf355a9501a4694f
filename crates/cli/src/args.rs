use clap::{ArgAction, Parser};
use importer_core::config::{AppConfig, MetadataBackend};
use importer_core::hashing::HashAlgorithm;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "media-import")]
#[command(about = "Imports photos, video and music into a date or artist organized tree", long_about = None)]
pub struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    pub config: Option<String>,

    /// Media source directory
    #[arg(long)]
    pub from: Option<String>,

    /// Media destination directory
    #[arg(long)]
    pub to: Option<String>,

    /// Delete the original file after placing it
    #[arg(long = "move")]
    pub move_files: bool,

    /// Print what would be done without doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum number of files processed at the same time (default: CPU count)
    #[arg(long)]
    pub max_procs: Option<usize>,

    /// Read metadata with exiftool only (requires exiftool on PATH)
    #[arg(long, conflicts_with = "try_exiftool")]
    pub exiftool: bool,

    /// Fall back to exiftool when the built-in reader finds nothing
    #[arg(long)]
    pub try_exiftool: bool,

    /// Content hash used in file names: sha1|blake3
    #[arg(long)]
    pub hash: Option<HashAlgorithm>,

    /// Glob of files or directories to leave out (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Command-line flags win over the config file.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(from) = &self.from {
            cfg.import.from = Some(from.clone());
        }
        if let Some(to) = &self.to {
            cfg.import.to = Some(to.clone());
        }
        if self.move_files {
            cfg.import.move_files = true;
        }
        if self.dry_run {
            cfg.import.dry_run = true;
        }
        if let Some(n) = self.max_procs {
            cfg.import.max_procs = Some(n);
        }
        if self.exiftool {
            cfg.metadata.backend = MetadataBackend::Exiftool;
        } else if self.try_exiftool {
            cfg.metadata.backend = MetadataBackend::Auto;
        }
        if let Some(hash) = self.hash {
            cfg.scan.hash = hash;
        }
        cfg.scan.exclude.extend(self.exclude.iter().cloned());
    }

    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
