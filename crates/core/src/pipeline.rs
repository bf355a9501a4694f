use crate::classifier;
use crate::config::{ImportSettings, MetadataConfig};
use crate::dispatcher::Dispatcher;
use crate::error::{ClassifyError, ImportError};
use crate::models::PlacementOutcome;
use crate::placement::{self, PathLocks};
use crate::scanner::{self, WalkSummary};
use crate::stats::{RunStatistics, RunSummary};
use providers::chain::FallbackProvider;
use providers::exiftool::{ExiftoolConfig, ExiftoolProvider};
use providers::native::NativeProvider;
use providers::{MetadataProvider, ProviderRegistry};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImportReport {
    pub summary: RunSummary,
    pub walk: WalkSummary,
    pub submitted: u64,
    pub cancelled: bool,
}

/// Imports every file below `settings.from` into `settings.to`.
///
/// Fails only if a root is unusable, before any file is touched. Per-file
/// problems end up in the report.
pub async fn run(
    settings: ImportSettings,
    provider: Arc<dyn MetadataProvider>,
    cancel: Arc<AtomicBool>,
) -> Result<ImportReport, ImportError> {
    scanner::verify_directory(&settings.from)?;
    scanner::verify_directory(&settings.to)?;

    info!(
        from = %settings.from.display(),
        to = %settings.to.display(),
        mode = ?settings.mode,
        dry_run = settings.dry_run,
        max_procs = settings.max_procs,
        provider = provider.name(),
        "Starting import..."
    );

    let settings = Arc::new(settings);
    let stats = Arc::new(RunStatistics::new());
    let locks = Arc::new(PathLocks::new());
    let mut dispatcher = Dispatcher::new(settings.max_procs, stats.clone());

    let (mut paths, walker) = scanner::discover(settings.from.clone(), settings.scan_options(), cancel.clone());
    while let Some(path) = paths.recv().await {
        let task = FileTask {
            settings: settings.clone(),
            provider: provider.clone(),
            stats: stats.clone(),
            locks: locks.clone(),
            path,
        };
        dispatcher.submit(move || task.run()).await;
    }

    let submitted = dispatcher.join().await;
    let walk = walker
        .await
        .map_err(|e| ImportError::Walker(e.to_string()))??;

    let report = ImportReport {
        summary: stats.snapshot(),
        walk,
        submitted,
        cancelled: cancel.load(Ordering::Relaxed),
    };
    info!(
        submitted,
        recorded = report.summary.total(),
        unreadable = walk.unreadable,
        cancelled = report.cancelled,
        "Import complete."
    );
    Ok(report)
}

/// One file's trip through metadata, naming and placement.
struct FileTask {
    settings: Arc<ImportSettings>,
    provider: Arc<dyn MetadataProvider>,
    stats: Arc<RunStatistics>,
    locks: Arc<PathLocks>,
    path: PathBuf,
}

impl FileTask {
    fn run(self) {
        let outcome = process_file(&self.path, &self.settings, self.provider.as_ref(), &self.locks);
        // Dry-run transfers never happened, so they are not tallied.
        if self.settings.dry_run && outcome.is_transfer() {
            return;
        }
        self.stats.record(outcome);
    }
}

pub fn process_file(
    path: &Path,
    settings: &ImportSettings,
    provider: &dyn MetadataProvider,
    locks: &PathLocks,
) -> PlacementOutcome {
    let tags = match provider.extract(path) {
        Ok(tags) => tags,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no metadata");
            return PlacementOutcome::NoMetadata;
        }
    };

    let classification = match classifier::classify(&tags, path, &settings.to, || {
        settings.hash.hex_digest(path)
    }) {
        Ok(c) => c,
        Err(e @ ClassifyError::InvalidDate(_)) => {
            warn!(path = %path.display(), error = %e, "unusable date tag");
            return PlacementOutcome::NoMetadata;
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "classification failed");
            return PlacementOutcome::Failed;
        }
    };

    let Some(dest) = classification.destination() else {
        debug!(path = %path.display(), "no usable date tag");
        return PlacementOutcome::NoMetadata;
    };

    match placement::place(path, dest, settings, locks) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(path = %path.display(), error = %e, "placement failed");
            PlacementOutcome::Failed
        }
    }
}

pub fn build_registry(config: &MetadataConfig) -> ProviderRegistry {
    let native: Arc<dyn MetadataProvider> = Arc::new(NativeProvider);
    let exiftool: Arc<dyn MetadataProvider> = Arc::new(ExiftoolProvider::new(ExiftoolConfig {
        program: PathBuf::from(&config.exiftool_path),
        timeout: config.timeout(),
    }));
    let auto = FallbackProvider::new("auto", vec![native.clone(), exiftool.clone()]);

    ProviderRegistry::new()
        .with_provider("native", native)
        .with_provider("exiftool", exiftool)
        .with_provider("auto", Arc::new(auto))
        .set_preferred(config.backend.as_str())
}
