//! Ctrl-C handling: the first interrupt winds the import down, the second abandons it.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Exit status used when the user interrupts twice.
pub const ABORT_EXIT_CODE: i32 = 130;

/// Sets `cancel` on the first interrupt. Returns `true` once a second one
/// arrives, `false` if interrupts cannot be received at all.
pub async fn watch<F, Fut>(mut interrupted: F, cancel: Arc<AtomicBool>) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(e) = interrupted().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        return false;
    }
    warn!("Interrupted, finishing files already in progress (Ctrl-C again to abort)...");
    cancel.store(true, Ordering::Relaxed);

    if interrupted().await.is_err() {
        return false;
    }
    warn!("Interrupted again, aborting.");
    true
}
