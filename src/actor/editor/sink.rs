//! Worker output routed into the preview surface and the host.

use std::sync::Arc;

use crate::actor::worker::{CompileRequest, CompileSink, WorkerHealth};
use crate::compiler::{Artifact, CompileError};
use crate::host::{EventEmitter, OutboundEvent};
use crate::sync::{PreviewSurface, apply_artifact};

pub(super) struct PipelineSink {
    pub(super) surface: Arc<PreviewSurface>,
    pub(super) emitter: Option<Arc<dyn EventEmitter>>,
    /// Also push renders to the host
    pub(super) push_preview: bool,
}

impl PipelineSink {
    fn emit(&self, event: OutboundEvent) {
        if let Some(emitter) = &self.emitter {
            emitter.push_event(event);
        }
    }
}

impl CompileSink for PipelineSink {
    fn render(&mut self, artifact: Artifact) {
        if self.push_preview {
            self.emit(OutboundEvent::Preview {
                svg: artifact.svg().to_owned(),
            });
        }
        apply_artifact(&self.surface, artifact);
    }

    fn compile_error(&mut self, error: &CompileError) {
        self.emit(OutboundEvent::CompileError {
            message: error.message.clone(),
        });
    }

    fn dropped(&mut self, _request: &CompileRequest) {
        self.emit(OutboundEvent::CompileDropped {});
    }

    fn health(&mut self, health: &WorkerHealth) {
        self.emit(OutboundEvent::WorkerHealth(health.clone()));
    }
}
