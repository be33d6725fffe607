//! `preview` command: one headless editor, one compile, one SVG.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;

use crate::actor::worker::{ThreadWorkerFactory, WorkerHealth};
use crate::actor::{Editor, MountOptions};
use crate::compiler::{Artifact, PlaceholderBackend};
use crate::config::EditorConfig;
use crate::host::{EventEmitter, OutboundEvent};

/// Upper bound on waiting for the first artifact.
const PREVIEW_TIMEOUT: Duration = Duration::from_secs(30);

/// Forwards failure events so the waiter can stop early.
struct FailureEmitter(mpsc::UnboundedSender<String>);

impl EventEmitter for FailureEmitter {
    fn push_event(&self, event: OutboundEvent) {
        let reason = match event {
            OutboundEvent::CompileError { message } => message,
            OutboundEvent::CompileDropped {} => "compile worker was not ready".to_owned(),
            OutboundEvent::WorkerHealth(WorkerHealth::Down { reason }) => reason,
            _ => return,
        };
        let _ = self.0.send(reason);
    }
}

pub fn render_preview(file: &Path, output: Option<&Path>, config: &Arc<EditorConfig>) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    if text.is_empty() {
        bail!("{} is empty, nothing to compile", file.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let artifact = runtime.block_on(compile_once(text, Arc::clone(config)))?;

    match output {
        Some(path) => {
            fs::write(path, artifact.svg())
                .with_context(|| format!("failed to write {}", path.display()))?;
            crate::log!("preview"; "wrote {}", path.display());
        }
        None => println!("{}", artifact.svg()),
    }
    Ok(())
}

async fn compile_once(text: String, config: Arc<EditorConfig>) -> Result<Artifact> {
    let (fail_tx, mut fail_rx) = mpsc::unbounded_channel();
    let factory = Arc::new(ThreadWorkerFactory::new(Arc::new(PlaceholderBackend)));

    let editor = Editor::mount(
        config,
        MountOptions {
            initial_text: text,
            file_id: None,
            emitter: Some(Arc::new(FailureEmitter(fail_tx))),
        },
        factory,
    );
    let mut preview = editor.preview();

    let outcome = tokio::time::timeout(PREVIEW_TIMEOUT, async {
        tokio::select! {
            changed = preview.changed() => {
                changed.context("editor stopped before rendering")?;
                preview
                    .borrow_and_update()
                    .clone()
                    .context("preview surface is empty")
            }
            Some(reason) = fail_rx.recv() => bail!("compilation failed: {}", reason),
        }
    })
    .await;

    editor.unmount().await;
    outcome.context("timed out waiting for the preview")?
}
