//! Compile worker process.
//!
//! A worker is an OS thread that owns nothing but a [`CompileBackend`]. It
//! receives [`WorkerRequest`]s over a channel and answers each with exactly
//! one [`WorkerEvent::Response`], in order. A panic inside the backend kills
//! the worker: it reports [`WorkerEvent::Fault`] and exits.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, Sender};
use tokio::sync::mpsc::UnboundedSender;

use crate::actor::messages::{WorkerEvent, WorkerRequest, WorkerResponse};
use crate::compiler::CompileBackend;

/// Handle to a live worker process.
pub trait WorkerProcess: Send {
    /// Post a request. Fails if the process is gone.
    fn post(&mut self, request: WorkerRequest) -> Result<()>;

    /// Stop the process. Replies still in flight may arrive afterwards and
    /// are dropped by generation.
    fn terminate(self: Box<Self>);
}

/// Constructs worker processes.
pub trait WorkerFactory: Send + Sync {
    fn spawn(
        &self,
        generation: u64,
        events: UnboundedSender<WorkerEvent>,
    ) -> Result<Box<dyn WorkerProcess>>;
}

/// Spawns thread workers around a shared backend.
pub struct ThreadWorkerFactory {
    backend: Arc<dyn CompileBackend>,
}

impl ThreadWorkerFactory {
    pub fn new(backend: Arc<dyn CompileBackend>) -> Self {
        Self { backend }
    }
}

impl WorkerFactory for ThreadWorkerFactory {
    fn spawn(
        &self,
        generation: u64,
        events: UnboundedSender<WorkerEvent>,
    ) -> Result<Box<dyn WorkerProcess>> {
        let (tx, rx) = channel::unbounded::<WorkerRequest>();
        let backend = Arc::clone(&self.backend);

        std::thread::Builder::new()
            .name(format!("compile-worker-{generation}"))
            .spawn(move || worker_main(generation, backend, rx, events))
            .context("failed to spawn compile worker thread")?;

        Ok(Box::new(ThreadWorker { tx }))
    }
}

struct ThreadWorker {
    tx: Sender<WorkerRequest>,
}

impl WorkerProcess for ThreadWorker {
    fn post(&mut self, request: WorkerRequest) -> Result<()> {
        self.tx
            .send(request)
            .map_err(|_| anyhow::anyhow!("compile worker is gone"))
    }

    fn terminate(self: Box<Self>) {
        // Dropping the sender ends the worker loop after the current compile.
    }
}

fn worker_main(
    generation: u64,
    backend: Arc<dyn CompileBackend>,
    rx: Receiver<WorkerRequest>,
    events: UnboundedSender<WorkerEvent>,
) {
    if events.send(WorkerEvent::Ready { generation }).is_err() {
        return;
    }

    while let Ok(request) = rx.recv() {
        let WorkerRequest::Compile { content } = request;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| backend.compile(&content)));
        let event = match outcome {
            Ok(Ok(artifact)) => WorkerEvent::Response {
                generation,
                response: WorkerResponse::Render {
                    svg: artifact.svg().to_owned(),
                },
            },
            Ok(Err(err)) => WorkerEvent::Response {
                generation,
                response: WorkerResponse::Error {
                    message: err.message,
                },
            },
            Err(payload) => {
                let _ = events.send(WorkerEvent::Fault {
                    generation,
                    message: panic_message(payload.as_ref()),
                });
                return;
            }
        };

        if events.send(event).is_err() {
            return;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "compile worker panicked".to_owned())
}
