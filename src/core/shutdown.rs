//! Ctrl+C handling for the continuous loop.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The first Ctrl+C asks the controller to stop; it leaves its loop, releases
/// the filesystem watch and exits normally. A second Ctrl+C exits immediately.
pub fn setup_shutdown_handler(shutdown_tx: UnboundedSender<()>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if SHUTDOWN.swap(true, Ordering::SeqCst) || shutdown_tx.send(()).is_err() {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
