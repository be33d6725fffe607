use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

use super::Snapshot;
use crate::actor::messages::EditorMsg;
use crate::compiler::Artifact;
use crate::document::{Change, DocumentError};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("editor is no longer mounted")]
    Gone,

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Cloneable handle to a mounted editor.
#[derive(Debug, Clone)]
pub struct EditorHandle {
    tx: mpsc::Sender<EditorMsg>,
    preview: watch::Receiver<Option<Artifact>>,
}

impl EditorHandle {
    pub(super) fn new(
        tx: mpsc::Sender<EditorMsg>,
        preview: watch::Receiver<Option<Artifact>>,
    ) -> Self {
        Self { tx, preview }
    }

    async fn send(&self, msg: EditorMsg) -> Result<(), EditorError> {
        self.tx.send(msg).await.map_err(|_| EditorError::Gone)
    }

    /// Apply a local edit. Returns the new revision, `None` for an empty change.
    pub async fn edit(&self, change: Change) -> Result<Option<u64>, EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(EditorMsg::Edit {
            change,
            reply: Some(reply),
        })
        .await?;
        Ok(rx.await.map_err(|_| EditorError::Gone)??)
    }

    /// Fold externally pushed content into the document.
    pub async fn content_updated(&self, content: impl Into<String>) -> Result<(), EditorError> {
        self.send(EditorMsg::ContentUpdated {
            content: content.into(),
        })
        .await
    }

    /// Show an artifact rendered elsewhere.
    pub async fn update_preview(&self, svg: impl Into<String>) -> Result<(), EditorError> {
        self.send(EditorMsg::UpdatePreview { svg: svg.into() }).await
    }

    /// Start the compile worker if there is none. Resolves once the request
    /// was handled, not when the worker is ready.
    pub async fn ensure_worker(&self) -> Result<(), EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(EditorMsg::EnsureWorker { reply: Some(reply) })
            .await?;
        rx.await.map_err(|_| EditorError::Gone)
    }

    pub async fn snapshot(&self) -> Result<Snapshot, EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(EditorMsg::Snapshot(reply)).await?;
        rx.await.map_err(|_| EditorError::Gone)
    }

    /// Observe the preview surface.
    pub fn preview(&self) -> watch::Receiver<Option<Artifact>> {
        self.preview.clone()
    }

    /// Cancel pending autosave, tear the worker down and stop the actor.
    /// Unmounting an editor that is already gone is a no-op.
    pub async fn unmount(&self) {
        let (reply, rx) = oneshot::channel();
        if self
            .send(EditorMsg::Unmount { reply: Some(reply) })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }

    /// Fire-and-forget send from a plain thread (outside the runtime).
    pub fn dispatch_blocking(&self, msg: EditorMsg) -> Result<(), EditorError> {
        self.tx.blocking_send(msg).map_err(|_| EditorError::Gone)
    }
}
