//! Scripted worker processes for pipeline tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use super::{CompileSink, CompileRequest, WorkerFactory, WorkerHealth, WorkerProcess};
use crate::actor::messages::{WorkerEvent, WorkerRequest, WorkerResponse};
use crate::compiler::{Artifact, CompileError};

/// How a fake process behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Script {
    /// Report ready on spawn, render every request immediately
    Echo,
    /// Report ready on spawn, never answer
    Silent,
    /// Never report ready
    Stuck,
    /// Report ready, then fail every post as if the thread had died
    Broken,
}

#[derive(Default)]
struct Shared {
    spawned: AtomicUsize,
    posted: Mutex<Vec<String>>,
    events: Mutex<Option<(u64, UnboundedSender<WorkerEvent>)>>,
}

/// Factory counting constructions and recording every posted source.
#[derive(Clone)]
pub(crate) struct FakeFactory {
    script: Script,
    shared: Arc<Shared>,
}

impl FakeFactory {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            shared: Arc::default(),
        }
    }

    pub(crate) fn spawned(&self) -> usize {
        self.shared.spawned.load(Ordering::SeqCst)
    }

    pub(crate) fn posted(&self) -> Vec<String> {
        self.shared.posted.lock().clone()
    }

    /// Emit an event as the most recently spawned process.
    pub(crate) fn emit(&self, make: impl FnOnce(u64) -> WorkerEvent) {
        if let Some((generation, tx)) = self.shared.events.lock().as_ref() {
            let _ = tx.send(make(*generation));
        }
    }
}

impl WorkerFactory for FakeFactory {
    fn spawn(
        &self,
        generation: u64,
        events: UnboundedSender<WorkerEvent>,
    ) -> Result<Box<dyn WorkerProcess>> {
        self.shared.spawned.fetch_add(1, Ordering::SeqCst);
        if self.script != Script::Stuck {
            let _ = events.send(WorkerEvent::Ready { generation });
        }
        *self.shared.events.lock() = Some((generation, events.clone()));
        Ok(Box::new(FakeProcess {
            generation,
            script: self.script,
            events,
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct FakeProcess {
    generation: u64,
    script: Script,
    events: UnboundedSender<WorkerEvent>,
    shared: Arc<Shared>,
}

impl WorkerProcess for FakeProcess {
    fn post(&mut self, request: WorkerRequest) -> Result<()> {
        let WorkerRequest::Compile { content } = request;
        if self.script == Script::Broken {
            anyhow::bail!("compile worker channel closed");
        }
        self.shared.posted.lock().push(content.clone());
        if self.script == Script::Echo {
            let _ = self.events.send(WorkerEvent::Response {
                generation: self.generation,
                response: WorkerResponse::Render {
                    svg: format!("<svg>{content}</svg>"),
                },
            });
        }
        Ok(())
    }

    fn terminate(self: Box<Self>) {}
}

/// What a [`RecordingSink`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Seen {
    Render(String),
    Error(String),
    Dropped(String),
    Health(WorkerHealth),
}

#[derive(Clone, Default)]
pub(crate) struct RecordingSink(Arc<Mutex<Vec<Seen>>>);

impl RecordingSink {
    pub(crate) fn seen(&self) -> Vec<Seen> {
        self.0.lock().clone()
    }

    pub(crate) fn renders(&self) -> Vec<String> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Render(svg) => Some(svg),
                _ => None,
            })
            .collect()
    }
}

impl CompileSink for RecordingSink {
    fn render(&mut self, artifact: Artifact) {
        self.0.lock().push(Seen::Render(artifact.svg().to_owned()));
    }

    fn compile_error(&mut self, error: &CompileError) {
        self.0.lock().push(Seen::Error(error.message.clone()));
    }

    fn dropped(&mut self, request: &CompileRequest) {
        self.0.lock().push(Seen::Dropped(request.source.clone()));
    }

    fn health(&mut self, health: &WorkerHealth) {
        self.0.lock().push(Seen::Health(health.clone()));
    }
}
