//! Compile Worker Manager
//!
//! Owns the single compile worker of one editor:
//!
//! ```text
//! Absent --ensure--> Starting --ready--> Ready <--> Compiling
//!   ^                                      |            |
//!   +---------------- fault ---------------+------------+
//!                         (restart per policy)
//! any --teardown--> Terminated
//! ```
//!
//! The manager is a plain state machine driven by the editor actor: every
//! method runs on the actor task, timers are exposed as deadlines
//! ([`WorkerManager::next_deadline`]) and fired through
//! [`WorkerManager::poll`].
//!
//! After a fault the newest unanswered source is kept and sent again once
//! the restarted process reports ready. Requests made while a restart is
//! pending wait for it instead of spawning early.

mod process;
mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use super::messages::{WorkerEvent, WorkerRequest, WorkerResponse};
use crate::compiler::{Artifact, CompileError};

pub use process::{ThreadWorkerFactory, WorkerFactory, WorkerProcess};
pub use supervisor::{RestartPolicy, WorkerHealth};

/// Lifecycle state of the worker handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Absent,
    Starting,
    Ready,
    Compiling,
    Terminated,
}

impl WorkerState {
    fn accepts_requests(self) -> bool {
        matches!(self, Self::Ready | Self::Compiling)
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("compile worker was torn down")]
    Terminated,

    #[error("failed to start compile worker: {0}")]
    Spawn(String),
}

/// A compile of the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub source: String,
    pub request_id: u64,
}

/// What `request_compile` did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent(u64),
    Deferred(u64),
    Dropped(u64),
}

/// Receiver of manager output. Registered by whoever owns the preview.
pub trait CompileSink: Send {
    /// Latest artifact.
    fn render(&mut self, artifact: Artifact);

    /// Latest request failed to compile.
    fn compile_error(&mut self, _error: &CompileError) {}

    /// A request was dropped because no worker became ready in time.
    fn dropped(&mut self, _request: &CompileRequest) {}

    /// Worker health changed.
    fn health(&mut self, _health: &WorkerHealth) {}
}

/// Timing knobs.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Delay before a request made without a ready worker is re-checked
    pub retry_delay: Duration,
    pub restart: RestartPolicy,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(100),
            restart: RestartPolicy::default(),
        }
    }
}

struct Deferred {
    request: CompileRequest,
    due: Instant,
}

pub struct WorkerManager {
    factory: Arc<dyn WorkerFactory>,
    events: UnboundedSender<WorkerEvent>,
    settings: WorkerSettings,
    state: WorkerState,
    handle: Option<Box<dyn WorkerProcess>>,
    /// Generation of the current (or last) process
    generation: u64,
    next_request_id: u64,
    /// Request ids sent to the current process and not yet answered, oldest first
    in_flight: VecDeque<u64>,
    latest_sent: Option<CompileRequest>,
    deferred: Option<Deferred>,
    /// Newest source the next process must compile once ready
    resume: Option<CompileRequest>,
    restart_due: Option<Instant>,
    restart_attempts: u32,
    /// Backoff exhausted: only an explicit `ensure_worker` spawns again
    given_up: bool,
    sink: Option<Box<dyn CompileSink>>,
}

impl WorkerManager {
    pub fn new(
        factory: Arc<dyn WorkerFactory>,
        events: UnboundedSender<WorkerEvent>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            factory,
            events,
            settings,
            state: WorkerState::Absent,
            handle: None,
            generation: 0,
            next_request_id: 0,
            in_flight: VecDeque::new(),
            latest_sent: None,
            deferred: None,
            resume: None,
            restart_due: None,
            restart_attempts: 0,
            given_up: false,
            sink: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Register the output sink, replacing any previous one.
    pub fn register_sink(&mut self, sink: Box<dyn CompileSink>) {
        self.sink = Some(sink);
    }

    /// Make sure a worker exists. Constructs one only from `Absent`.
    pub fn ensure_worker(&mut self) -> Result<(), WorkerError> {
        match self.state {
            WorkerState::Terminated => return Err(WorkerError::Terminated),
            WorkerState::Starting | WorkerState::Ready | WorkerState::Compiling => return Ok(()),
            WorkerState::Absent => {}
        }

        if self.given_up {
            self.given_up = false;
            self.restart_attempts = 0;
        }

        // Claim the slot before constructing.
        self.state = WorkerState::Starting;
        self.generation += 1;
        self.restart_due = None;
        self.in_flight.clear();

        match self.factory.spawn(self.generation, self.events.clone()) {
            Ok(handle) => {
                crate::debug!("worker"; "spawned generation {}", self.generation);
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.state = WorkerState::Absent;
                crate::log!("worker"; "spawn failed: {:#}", e);
                Err(WorkerError::Spawn(format!("{e:#}")))
            }
        }
    }

    /// Compile `source`: sent now if a worker is ready, otherwise deferred
    /// for one re-check after `retry_delay`.
    pub fn request_compile(&mut self, source: String, now: Instant) -> Dispatch {
        self.next_request_id += 1;
        let request = CompileRequest {
            source,
            request_id: self.next_request_id,
        };

        match self.state {
            WorkerState::Terminated => {
                crate::debug!("worker"; "request {} after teardown", request.request_id);
                Dispatch::Dropped(request.request_id)
            }
            WorkerState::Ready | WorkerState::Compiling => {
                // A deferred request must never be sent after a newer one.
                if let Some(old) = self.deferred.take() {
                    crate::debug!("worker"; "request {} superseded by {}", old.request.request_id, request.request_id);
                }
                self.resume = None;
                self.send(request, now)
            }
            WorkerState::Absent if self.restart_due.is_some() => {
                // The restarted process picks it up.
                let id = request.request_id;
                crate::debug!("worker"; "request {} waits for restart", id);
                self.deferred = None;
                self.resume = Some(request);
                Dispatch::Deferred(id)
            }
            WorkerState::Absent | WorkerState::Starting => {
                if self.state == WorkerState::Absent && !self.given_up {
                    let _ = self.ensure_worker();
                }
                let id = request.request_id;
                if let Some(old) = self.deferred.take() {
                    crate::debug!("worker"; "request {} superseded by {}", old.request.request_id, id);
                }
                self.resume = None;
                self.deferred = Some(Deferred {
                    request,
                    due: now + self.settings.retry_delay,
                });
                Dispatch::Deferred(id)
            }
        }
    }

    fn send(&mut self, request: CompileRequest, now: Instant) -> Dispatch {
        let id = request.request_id;
        let Some(handle) = self.handle.as_mut() else {
            self.report_dropped(&request);
            return Dispatch::Dropped(id);
        };

        match handle.post(WorkerRequest::Compile {
            content: request.source.clone(),
        }) {
            Ok(()) => {
                self.in_flight.push_back(id);
                self.latest_sent = Some(request);
                self.state = WorkerState::Compiling;
                Dispatch::Sent(id)
            }
            Err(e) => {
                self.on_fault(format!("{e:#}"), now);
                // Never answered, so it is the newest pending source.
                if self.restart_due.is_some() {
                    self.resume = Some(request);
                    Dispatch::Deferred(id)
                } else {
                    self.report_dropped(&request);
                    Dispatch::Dropped(id)
                }
            }
        }
    }

    fn report_dropped(&mut self, request: &CompileRequest) {
        crate::log!("worker"; "dropped compile request {}", request.request_id);
        if let Some(sink) = self.sink.as_mut() {
            sink.dropped(request);
        }
    }

    /// Earliest pending timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        let deferred = self.deferred.as_ref().map(|d| d.due);
        match (deferred, self.restart_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire due timers.
    pub fn poll(&mut self, now: Instant) {
        if self.restart_due.is_some_and(|due| due <= now) {
            self.restart_due = None;
            crate::log!("worker"; "restarting (attempt {})", self.restart_attempts);
            let _ = self.ensure_worker();
        }

        if self.deferred.as_ref().is_some_and(|d| d.due <= now)
            && let Some(Deferred { request, .. }) = self.deferred.take()
        {
            if self.state.accepts_requests() {
                self.send(request, now);
            } else {
                self.report_dropped(&request);
            }
        }
    }

    /// Handle an event from a worker process.
    pub fn on_event(&mut self, event: WorkerEvent, now: Instant) {
        if event.generation() != self.generation || self.handle.is_none() {
            crate::debug!("worker"; "ignoring event from generation {}", event.generation());
            return;
        }

        match event {
            WorkerEvent::Ready { .. } => {
                if self.state == WorkerState::Starting {
                    self.state = WorkerState::Ready;
                    crate::debug!("worker"; "generation {} ready", self.generation);
                    if let Some(sink) = self.sink.as_mut() {
                        sink.health(&WorkerHealth::Ready);
                    }
                    if self.deferred.is_none()
                        && let Some(request) = self.resume.take()
                    {
                        crate::debug!("worker"; "resending request {}", request.request_id);
                        self.send(request, now);
                    }
                }
            }
            WorkerEvent::Response { response, .. } => self.on_response(response),
            WorkerEvent::Fault { message, .. } => self.on_fault(message, now),
        }
    }

    fn on_response(&mut self, response: WorkerResponse) {
        let id = self.in_flight.pop_front();
        if self.in_flight.is_empty() && self.state == WorkerState::Compiling {
            self.state = WorkerState::Ready;
        }
        // The process handled a request, so it is healthy again.
        self.restart_attempts = 0;

        let stale = match (id, &self.latest_sent) {
            (Some(id), Some(latest)) => id < latest.request_id,
            _ => false,
        };

        match response {
            WorkerResponse::Render { svg } => {
                if stale {
                    crate::debug!("worker"; "skipping stale render {:?}", id);
                    return;
                }
                if let Some(sink) = self.sink.as_mut() {
                    sink.render(Artifact::from_svg(svg));
                }
            }
            WorkerResponse::Error { message } => {
                crate::log!("compile"; "error: {}", message);
                if stale {
                    return;
                }
                if let Some(sink) = self.sink.as_mut() {
                    sink.compile_error(&CompileError::new(message));
                }
            }
        }
    }

    fn on_fault(&mut self, message: String, now: Instant) {
        crate::log!("worker"; "process fault: {}", message);
        if let Some(handle) = self.handle.take() {
            handle.terminate();
        }
        // Newest unanswered source: a deferral, else the last request sent.
        let pending = match self.deferred.take() {
            Some(deferred) => Some(deferred.request),
            None if !self.in_flight.is_empty() => self.latest_sent.clone(),
            None => self.resume.take(),
        };
        self.in_flight.clear();
        self.state = WorkerState::Absent;

        let health = match self.settings.restart.delay(self.restart_attempts) {
            Some(delay) => {
                self.restart_attempts += 1;
                self.restart_due = Some(now + delay);
                self.resume = pending;
                WorkerHealth::Restarting {
                    attempt: self.restart_attempts,
                    delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                }
            }
            None => {
                // `never` keeps respawning on the next request.
                self.given_up = matches!(self.settings.restart, RestartPolicy::Backoff { .. });
                if let Some(request) = pending {
                    self.report_dropped(&request);
                }
                WorkerHealth::Down { reason: message }
            }
        };
        if let Some(sink) = self.sink.as_mut() {
            sink.health(&health);
        }
    }

    /// Terminate the worker and release everything. Idempotent.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.terminate();
            crate::debug!("worker"; "terminated generation {}", self.generation);
        }
        self.state = WorkerState::Terminated;
        self.sink = None;
        self.deferred = None;
        self.resume = None;
        self.restart_due = None;
        self.in_flight.clear();
    }
}
