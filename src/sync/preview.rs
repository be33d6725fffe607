//! Preview surface.
//!
//! Holds the most recent [`Artifact`]. Content is only ever replaced as a
//! whole; observers see it through a `watch` channel, so a slow observer
//! skips intermediate artifacts and always ends on the latest one.

use tokio::sync::watch;

use crate::compiler::Artifact;

#[derive(Debug)]
pub struct PreviewSurface {
    tx: watch::Sender<Option<Artifact>>,
}

impl Default for PreviewSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSurface {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Observe the surface. Starts with the current content.
    pub fn subscribe(&self) -> watch::Receiver<Option<Artifact>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Artifact> {
        self.tx.borrow().clone()
    }
}

/// Replace the surface content with `artifact`.
///
/// Applying the same artifact twice leaves the surface as after the first.
pub fn apply_artifact(surface: &PreviewSurface, artifact: Artifact) {
    crate::debug!("preview"; "apply artifact ({} bytes)", artifact.svg().len());
    surface.tx.send_replace(Some(artifact));
}
