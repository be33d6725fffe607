//! `serve` command: WebSocket host transport.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actor::worker::ThreadWorkerFactory;
use crate::compiler::PlaceholderBackend;
use crate::config::EditorConfig;
use crate::host::client::ClientContext;
use crate::host::start_host_server;

/// Serve until Ctrl+C.
pub fn serve(config: Arc<EditorConfig>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("editor-actor")
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let ctx = Arc::new(ClientContext {
        config: Arc::clone(&config),
        factory: Arc::new(ThreadWorkerFactory::new(Arc::new(PlaceholderBackend))),
        runtime: runtime.handle().clone(),
    });

    let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
    crate::core::register_shutdown(shutdown_tx);

    let addr = start_host_server(config.serve.interface, config.serve.port, ctx)?;
    crate::log!("serve"; "listening on ws://{}", addr);

    // Blocks until Ctrl+C
    let _ = shutdown_rx.recv();

    runtime.shutdown_timeout(std::time::Duration::from_secs(1));
    Ok(())
}
