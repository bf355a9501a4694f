//! Walks the source tree and hands every regular file to the importer.

use crate::error::ImportError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub exclude: Vec<String>,
    pub include_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            include_hidden: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    /// Regular files handed to the visitor.
    pub files: u64,
    /// Entries that could not be read; their subtrees were skipped.
    pub unreadable: u64,
}

pub fn verify_directory(path: &Path) -> Result<(), ImportError> {
    let meta = fs::metadata(path).map_err(|source| ImportError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ImportError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Recursive, single-threaded descent. `visit` is called once per regular
/// file and returns `false` to stop the walk early.
pub fn walk<F>(root: &Path, options: &ScanOptions, mut visit: F) -> Result<WalkSummary, ImportError>
where
    F: FnMut(PathBuf) -> bool,
{
    verify_directory(root)?;
    let excludes = build_globset(&options.exclude)?;
    let mut summary = WalkSummary::default();

    let entries = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || should_descend(e.path(), options.include_hidden, &excludes));

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
                summary.unreadable += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            if !entry.file_type().is_dir() {
                debug!(path = %entry.path().display(), "not a regular file, ignoring");
            }
            continue;
        }

        if !visit(entry.into_path()) {
            break;
        }
        summary.files += 1;
    }

    Ok(summary)
}

/// Runs [`walk`] on a blocking thread, feeding a bounded channel. The walker
/// stalls whenever the receiver is not keeping up, and stops once `cancel`
/// is set or the receiver is dropped.
pub fn discover(
    root: PathBuf,
    options: ScanOptions,
    cancel: Arc<AtomicBool>,
) -> (mpsc::Receiver<PathBuf>, JoinHandle<Result<WalkSummary, ImportError>>) {
    let (tx, rx) = mpsc::channel(1);
    let handle = task::spawn_blocking(move || {
        walk(&root, &options, |path| {
            !cancel.load(Ordering::Relaxed) && tx.blocking_send(path).is_ok()
        })
    });
    (rx, handle)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ImportError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, include_hidden: bool, excludes: &GlobSet) -> bool {
    if excludes.is_match(path) {
        return false;
    }
    include_hidden || !is_hidden(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("DCIM/100CANON")).unwrap();
        fs::create_dir_all(root.join(".Trashes")).unwrap();
        fs::write(root.join("DCIM/100CANON/IMG_0001.JPG"), b"a").unwrap();
        fs::write(root.join("DCIM/100CANON/IMG_0001.THM"), b"b").unwrap();
        fs::write(root.join("DCIM/clip.mov"), b"c").unwrap();
        fs::write(root.join(".Trashes/old.jpg"), b"d").unwrap();
        fs::write(root.join(".hidden.jpg"), b"e").unwrap();
        dir
    }

    fn collect(root: &Path, options: &ScanOptions) -> (Vec<String>, WalkSummary) {
        let mut seen = Vec::new();
        let summary = walk(root, options, |p| {
            seen.push(p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"));
            true
        })
        .unwrap();
        seen.sort();
        (seen, summary)
    }

    #[test]
    fn visits_every_regular_file_by_default() {
        let dir = tree();
        let (seen, summary) = collect(dir.path(), &ScanOptions::default());
        assert_eq!(
            seen,
            vec![
                ".Trashes/old.jpg",
                ".hidden.jpg",
                "DCIM/100CANON/IMG_0001.JPG",
                "DCIM/100CANON/IMG_0001.THM",
                "DCIM/clip.mov",
            ]
        );
        assert_eq!(summary.files, 5);
        assert_eq!(summary.unreadable, 0);
    }

    #[test]
    fn hidden_and_excluded_entries_are_pruned() {
        let dir = tree();
        let options = ScanOptions {
            exclude: vec!["*.THM".to_string()],
            include_hidden: false,
        };
        let (seen, _) = collect(dir.path(), &options);
        assert_eq!(seen, vec!["DCIM/100CANON/IMG_0001.JPG", "DCIM/clip.mov"]);
    }

    #[test]
    fn visitor_can_stop_the_walk() {
        let dir = tree();
        let mut calls = 0;
        let summary = walk(dir.path(), &ScanOptions::default(), |_| {
            calls += 1;
            calls < 2
        })
        .unwrap();
        assert_eq!(calls, 2);
        assert_eq!(summary.files, 1);
    }

    #[test]
    fn root_must_be_a_directory() {
        let dir = tree();
        let file = dir.path().join("DCIM/clip.mov");
        assert!(matches!(
            walk(&file, &ScanOptions::default(), |_| true),
            Err(ImportError::NotADirectory(p)) if p == file
        ));
        assert!(matches!(
            walk(&dir.path().join("missing"), &ScanOptions::default(), |_| true),
            Err(ImportError::Unreadable { .. })
        ));
    }

    #[test]
    fn bad_glob_is_rejected() {
        let dir = tree();
        let options = ScanOptions {
            exclude: vec!["[".to_string()],
            include_hidden: true,
        };
        assert!(matches!(
            walk(dir.path(), &options, |_| true),
            Err(ImportError::Pattern(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subtree_does_not_stop_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree();
        let locked = dir.path().join("DCIM/100CANON");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Root ignores permission bits; nothing to observe then.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let (seen, summary) = collect(dir.path(), &ScanOptions::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(seen.contains(&"DCIM/clip.mov".to_string()));
        assert!(!seen.iter().any(|p| p.starts_with("DCIM/100CANON/")));
        assert_eq!(summary.unreadable, 1);
    }

    #[tokio::test]
    async fn discover_streams_paths() {
        let dir = tree();
        let (mut rx, handle) = discover(
            dir.path().to_path_buf(),
            ScanOptions::default(),
            Arc::new(AtomicBool::new(false)),
        );
        let mut count = 0;
        while let Some(path) = rx.recv().await {
            assert!(path.is_file());
            count += 1;
        }
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(count, 5);
        assert_eq!(summary.files, 5);
    }

    #[tokio::test]
    async fn cancelled_discovery_sends_nothing() {
        let dir = tree();
        let (mut rx, handle) = discover(
            dir.path().to_path_buf(),
            ScanOptions::default(),
            Arc::new(AtomicBool::new(true)),
        );
        assert!(rx.recv().await.is_none());
        assert_eq!(handle.await.unwrap().unwrap().files, 0);
    }
}
