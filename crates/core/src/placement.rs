//! Placement executor: copy, move or skip a classified file.

use crate::config::ImportSettings;
use crate::error::PlacementError;
use crate::models::{PlacementOutcome, TransferMode};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, PoisonError};
use tracing::{debug, info};

/// Serializes the check-then-write sequence per destination path, so two
/// tasks that resolve to the same file cannot both pass the existence check.
#[derive(Debug, Default)]
pub struct PathLocks {
    held: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until no other task holds `path`.
    pub fn lock(&self, path: &Path) -> PathGuard<'_> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while held.contains(path) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.insert(path.to_path_buf());
        PathGuard {
            locks: self,
            path: path.to_path_buf(),
        }
    }
}

pub struct PathGuard<'a> {
    locks: &'a PathLocks,
    path: PathBuf,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        let mut held = self
            .locks
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.path);
        self.locks.released.notify_all();
    }
}

/// Places `source` at `dest`.
///
/// An occupied destination is always `Skipped`, dry run or not. In dry-run
/// mode the intended transfer is logged and reported without touching the
/// filesystem.
pub fn place(
    source: &Path,
    dest: &Path,
    settings: &ImportSettings,
    locks: &PathLocks,
) -> Result<PlacementOutcome, PlacementError> {
    let _guard = locks.lock(dest);

    if occupied(dest) {
        info!("Skipping file: {}", dest.display());
        return Ok(PlacementOutcome::Skipped);
    }

    match settings.mode {
        TransferMode::Move => info!("Moving file: {} -> {}", source.display(), dest.display()),
        TransferMode::Copy => info!("Copying file: {} -> {}", source.display(), dest.display()),
    }
    if settings.dry_run {
        return Ok(PlacementOutcome::for_mode(settings.mode));
    }

    if let Some(parent) = dest.parent() {
        create_parent(parent).map_err(|source| PlacementError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match settings.mode {
        TransferMode::Copy => copy_new(source, dest)?,
        TransferMode::Move => move_file(source, dest)?,
    }
    Ok(PlacementOutcome::for_mode(settings.mode))
}

/// Anything at the path counts, including dangling symlinks.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn create_parent(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }
    builder.create(dir)
}

/// Byte copy into a freshly created file. Never truncates an existing one;
/// a partial destination is removed on failure.
fn copy_new(from: &Path, to: &Path) -> Result<(), PlacementError> {
    let copy_err = |source: io::Error| PlacementError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let mut input = File::open(from).map_err(copy_err)?;
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
        .map_err(copy_err)?;

    let copied = io::copy(&mut input, &mut output).and_then(|_| output.sync_all());
    if let Err(e) = copied {
        drop(output);
        let _ = fs::remove_file(to);
        return Err(copy_err(e));
    }
    Ok(())
}

/// Atomic rename, falling back to copy-then-delete (e.g. across devices).
fn move_file(from: &Path, to: &Path) -> Result<(), PlacementError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(from = %from.display(), error = %e, "rename failed, copying instead");
            copy_new(from, to)?;
            fs::remove_file(from).map_err(|source| PlacementError::RemoveSource {
                path: from.to_path_buf(),
                source,
            })
        }
    }
}
