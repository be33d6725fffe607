//! Editor Actor
//!
//! One task per mounted editor. Owns the document, its tokens, the autosave
//! debouncer and the compile worker manager; everything else talks to it
//! through an [`EditorHandle`].
//!
//! ```text
//! edit / content_updated
//!     │
//!     ▼
//! Document ──► tokenize ──► tokens
//!     │
//!     ├──► Debouncer ──(quiet period)──► autosave {file_id, content}
//!     │
//!     └──► WorkerManager ──► worker ──► PipelineSink ──► PreviewSurface
//! ```

// Pure timing for autosave.
mod debouncer;
// Caller-side API.
mod handle;
// Worker output routing.
mod sink;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::messages::{EditorMsg, WorkerEvent};
use super::worker::{WorkerFactory, WorkerManager, WorkerState};
use crate::compiler::Artifact;
use crate::config::EditorConfig;
use crate::document::{DocChange, Document};
use crate::host::{EventEmitter, OutboundEvent};
use crate::sync::{PreviewSurface, apply_artifact, reconcile};
use crate::syntax::{Token, tokenize};

use debouncer::Debouncer;
use sink::PipelineSink;

pub use handle::{EditorError, EditorHandle};

/// Inbound mailbox size.
const MAILBOX: usize = 64;

/// What the host provides at mount time.
#[derive(Default)]
pub struct MountOptions {
    pub initial_text: String,
    /// Identity of the edited file. Without it autosave is off.
    pub file_id: Option<String>,
    /// Outbound transport. Without it autosave and pushes are off.
    pub emitter: Option<Arc<dyn EventEmitter>>,
}

/// Point-in-time view of an editor.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub text: String,
    pub revision: u64,
    pub tokens: Vec<Token>,
    pub worker: WorkerState,
    pub autosave_pending: bool,
}

pub struct Editor;

impl Editor {
    /// Mount an editor: spawn its actor on the current tokio runtime.
    ///
    /// Tokens are computed for the initial text, the worker is started and,
    /// for non-empty text, a first compile is requested.
    pub fn mount(
        config: Arc<EditorConfig>,
        options: MountOptions,
        factory: Arc<dyn WorkerFactory>,
    ) -> EditorHandle {
        let (tx, rx) = mpsc::channel(MAILBOX);
        let (worker_tx, worker_rx) = mpsc::unbounded_channel();
        let surface = Arc::new(PreviewSurface::new());

        let mut manager = WorkerManager::new(factory, worker_tx, config.worker_settings());
        manager.register_sink(Box::new(PipelineSink {
            surface: Arc::clone(&surface),
            emitter: options.emitter.clone(),
            push_preview: config.preview.push,
        }));

        let autosave = match (options.file_id, options.emitter) {
            (Some(file_id), Some(emitter)) if config.autosave.enabled => Some(Autosave {
                file_id,
                emitter,
                debouncer: Debouncer::new(config.autosave.debounce()),
            }),
            _ => None,
        };

        let document = Document::new(options.initial_text);
        let tokens = tokenize(document.text()).collect();
        let handle = EditorHandle::new(tx, surface.subscribe());

        let actor = EditorActor {
            rx,
            worker_rx,
            document,
            tokens,
            autosave,
            manager,
            surface,
        };
        tokio::spawn(actor.run());

        handle
    }
}

/// Autosave target, present only when file id, emitter and config allow it.
struct Autosave {
    file_id: String,
    emitter: Arc<dyn EventEmitter>,
    debouncer: Debouncer,
}

struct EditorActor {
    rx: mpsc::Receiver<EditorMsg>,
    worker_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    document: Document,
    tokens: Vec<Token>,
    autosave: Option<Autosave>,
    manager: WorkerManager,
    surface: Arc<PreviewSurface>,
}

impl EditorActor {
    async fn run(mut self) {
        self.on_mount();

        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                biased;

                msg = self.rx.recv() => match msg {
                    Some(msg) => {
                        if !self.handle(msg) {
                            break;
                        }
                    }
                    // Every handle dropped
                    None => {
                        self.shutdown();
                        break;
                    }
                },

                Some(event) = self.worker_rx.recv() => {
                    self.manager.on_event(event, Instant::now());
                }

                _ = sleep_until(deadline) => self.on_timer(Instant::now()),
            }
        }

        crate::debug!("editor"; "actor stopped at revision {}", self.document.revision());
    }

    fn on_mount(&mut self) {
        if let Err(e) = self.manager.ensure_worker() {
            crate::log!("editor"; "compile worker unavailable: {}", e);
        }
        if !self.document.is_empty() {
            let text = self.document.text().to_owned();
            self.manager.request_compile(text, Instant::now());
        }
    }

    /// Returns `false` when the actor should stop.
    fn handle(&mut self, msg: EditorMsg) -> bool {
        match msg {
            EditorMsg::Edit { change, reply } => {
                let result = self.document.apply(change);
                let outcome = match result {
                    Ok(Some(change)) => {
                        let revision = change.revision;
                        self.on_change(change);
                        Ok(Some(revision))
                    }
                    Ok(None) => Ok(None),
                    Err(e) => {
                        crate::debug!("editor"; "rejected edit: {}", e);
                        Err(e)
                    }
                };
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            EditorMsg::ContentUpdated { content } => {
                if let Some(change) = reconcile(&mut self.document, &content) {
                    self.on_change(change);
                }
            }
            EditorMsg::UpdatePreview { svg } => {
                apply_artifact(&self.surface, Artifact::from_svg(svg));
            }
            EditorMsg::EnsureWorker { reply } => {
                if let Err(e) = self.manager.ensure_worker() {
                    crate::log!("editor"; "compile worker unavailable: {}", e);
                }
                if let Some(reply) = reply {
                    let _ = reply.send(());
                }
            }
            EditorMsg::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            EditorMsg::Unmount { reply } => {
                self.shutdown();
                if let Some(reply) = reply {
                    let _ = reply.send(());
                }
                return false;
            }
        }
        true
    }

    /// Edit pipeline: runs once per accepted document change.
    fn on_change(&mut self, change: DocChange) {
        let now = Instant::now();
        crate::debug!(
            "editor";
            "revision {}: {}..{} -> {} bytes",
            change.revision,
            change.from,
            change.to,
            change.inserted.len()
        );

        self.tokens = tokenize(self.document.text()).collect();

        if let Some(autosave) = self.autosave.as_mut() {
            autosave.debouncer.touch(now);
        }

        self.manager
            .request_compile(self.document.text().to_owned(), now);
    }

    fn on_timer(&mut self, now: Instant) {
        if let Some(autosave) = self.autosave.as_mut()
            && autosave.debouncer.take_if_ready(now)
        {
            crate::debug!("editor"; "autosave {}", autosave.file_id);
            autosave.emitter.push_event(OutboundEvent::Autosave {
                file_id: autosave.file_id.clone(),
                content: self.document.text().to_owned(),
            });
        }

        self.manager.poll(now);
    }

    fn next_deadline(&self) -> Option<Instant> {
        let autosave = self
            .autosave
            .as_ref()
            .and_then(|a| a.debouncer.deadline());
        match (autosave, self.manager.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.document.text().to_owned(),
            revision: self.document.revision(),
            tokens: self.tokens.clone(),
            worker: self.manager.state(),
            autosave_pending: self
                .autosave
                .as_ref()
                .is_some_and(|a| a.debouncer.is_pending()),
        }
    }

    /// Cancel the pending autosave (not flushed) and tear the worker down.
    fn shutdown(&mut self) {
        if let Some(autosave) = self.autosave.as_mut() {
            autosave.debouncer.cancel();
        }
        self.manager.teardown();
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
