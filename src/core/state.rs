//! Shutdown state for serve mode.
//!
//! `SHUTDOWN` is set once Ctrl+C is received. Long-running loops (acceptor,
//! connection threads) poll [`is_shutdown`]; the serve command blocks on the
//! registered channel instead.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender, registered by the serve command
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_shutdown()`: exit immediately, nothing to clean up
/// - After `register_shutdown()`: set the flag and notify the waiter
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        match SHUTDOWN_TX.get() {
            Some(tx) => {
                crate::log!("serve"; "shutting down...");
                let _ = tx.send(());
            }
            None => std::process::exit(0),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Route Ctrl+C to `shutdown_tx` instead of exiting.
pub fn register_shutdown(shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Check if shutdown has been requested
///
/// Relaxed ordering: worst case a loop runs one more iteration
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
