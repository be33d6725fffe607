use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::sleep;

use super::*;
use crate::actor::worker::WorkerHealth;
use crate::actor::worker::testing::{FakeFactory, Script};
use crate::config::RestartMode;
use crate::document::{Change, DocumentError};
use crate::syntax::TokenKind;

#[derive(Default)]
struct RecordingEmitter(Mutex<Vec<OutboundEvent>>);

impl EventEmitter for RecordingEmitter {
    fn push_event(&self, event: OutboundEvent) {
        self.0.lock().push(event);
    }
}

impl RecordingEmitter {
    fn events(&self) -> Vec<OutboundEvent> {
        self.0.lock().clone()
    }

    fn autosaves(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                OutboundEvent::Autosave { content, .. } => Some(content),
                _ => None,
            })
            .collect()
    }
}

struct Harness {
    handle: EditorHandle,
    factory: FakeFactory,
    emitter: Arc<RecordingEmitter>,
}

fn mount_with(config: EditorConfig, script: Script, text: &str, file_id: Option<&str>) -> Harness {
    let factory = FakeFactory::new(script);
    let emitter = Arc::new(RecordingEmitter::default());
    let handle = Editor::mount(
        Arc::new(config),
        MountOptions {
            initial_text: text.to_owned(),
            file_id: file_id.map(str::to_owned),
            emitter: Some(emitter.clone() as Arc<dyn EventEmitter>),
        },
        Arc::new(factory.clone()),
    );
    Harness {
        handle,
        factory,
        emitter,
    }
}

fn mount(script: Script, text: &str, file_id: Option<&str>) -> Harness {
    mount_with(EditorConfig::default(), script, text, file_id)
}

fn preview_svg(handle: &EditorHandle) -> Option<String> {
    handle
        .preview()
        .borrow()
        .as_ref()
        .map(|a| a.svg().to_owned())
}

#[tokio::test(start_paused = true)]
async fn test_mount_edit_autosave_end_to_end() {
    let h = mount(Script::Echo, "= Hi", Some("doc-1"));

    // Initial compile goes out once the worker is ready.
    sleep(Duration::from_millis(150)).await;
    assert_eq!(h.factory.posted(), vec!["= Hi"]);
    assert_eq!(preview_svg(&h.handle).as_deref(), Some("<svg>= Hi</svg>"));

    let revision = h.handle.edit(Change::insert(1, "==")).await.unwrap();
    assert_eq!(revision, Some(1));

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.text, "=== Hi");
    assert_eq!(snapshot.tokens[0].kind, TokenKind::Heading3);
    assert!(snapshot.autosave_pending);

    // Nothing before the quiet period ends.
    sleep(Duration::from_millis(400)).await;
    assert!(h.emitter.autosaves().is_empty());

    sleep(Duration::from_millis(200)).await;
    assert_eq!(h.emitter.autosaves(), vec!["=== Hi"]);
    assert_eq!(
        h.emitter.events().iter().find(|e| matches!(e, OutboundEvent::Autosave { .. })),
        Some(&OutboundEvent::Autosave {
            file_id: "doc-1".into(),
            content: "=== Hi".into(),
        })
    );

    // One compile per change.
    assert_eq!(h.factory.posted(), vec!["= Hi", "=== Hi"]);
    assert_eq!(preview_svg(&h.handle).as_deref(), Some("<svg>=== Hi</svg>"));
    assert_eq!(h.factory.spawned(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_autosave_once_with_last_content() {
    let h = mount(Script::Echo, "", Some("doc-1"));

    for (i, ch) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
        h.handle.edit(Change::insert(i, ch)).await.unwrap();
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_secs(1)).await;

    assert_eq!(h.emitter.autosaves(), vec!["abcde"]);
    assert!(!h.handle.snapshot().await.unwrap().autosave_pending);
}

#[tokio::test(start_paused = true)]
async fn test_no_file_id_disables_autosave() {
    let h = mount(Script::Echo, "", None);

    h.handle.edit(Change::insert(0, "= Draft")).await.unwrap();
    sleep(Duration::from_secs(2)).await;

    assert!(h.emitter.autosaves().is_empty());
    assert!(!h.handle.snapshot().await.unwrap().autosave_pending);
    // Compiles still happen.
    assert_eq!(h.factory.posted(), vec!["= Draft"]);
}

#[tokio::test(start_paused = true)]
async fn test_autosave_disabled_in_config() {
    let mut config = EditorConfig::default();
    config.autosave.enabled = false;
    let h = mount_with(config, Script::Echo, "", Some("doc-1"));

    h.handle.edit(Change::insert(0, "x")).await.unwrap();
    sleep(Duration::from_secs(2)).await;
    assert!(h.emitter.autosaves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_ensure_constructs_one_worker() {
    let mut config = EditorConfig::default();
    config.worker.restart.mode = RestartMode::Never;
    let h = mount_with(config, Script::Stuck, "", None);
    let other = h.handle.clone();

    // Kill the mount-time worker so the race starts from an absent handle.
    sleep(Duration::from_millis(1)).await;
    h.factory.emit(|generation| WorkerEvent::Fault {
        generation,
        message: "gone".into(),
    });
    sleep(Duration::from_millis(1)).await;
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.worker, WorkerState::Absent);
    assert_eq!(h.factory.spawned(), 1);

    let (a, b, c) = tokio::join!(
        h.handle.ensure_worker(),
        other.ensure_worker(),
        h.handle.ensure_worker()
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());

    assert_eq!(h.factory.spawned(), 2);
    assert_eq!(
        h.handle.snapshot().await.unwrap().worker,
        WorkerState::Starting
    );
}

#[tokio::test(start_paused = true)]
async fn test_unready_worker_drops_request_visibly() {
    let h = mount(Script::Stuck, "= Hi", None);

    sleep(Duration::from_millis(500)).await;

    assert!(h.factory.posted().is_empty());
    assert_eq!(preview_svg(&h.handle), None);
    assert_eq!(h.emitter.events(), vec![OutboundEvent::CompileDropped {}]);
}

#[tokio::test(start_paused = true)]
async fn test_content_sync() {
    let h = mount(Script::Echo, "= Same", Some("doc-1"));
    sleep(Duration::from_millis(150)).await;

    h.handle.content_updated("= Same").await.unwrap();
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.revision, 0);
    assert!(!snapshot.autosave_pending);

    h.handle.content_updated("== Other").await.unwrap();
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.revision, 1);
    assert_eq!(snapshot.text, "== Other");
    assert_eq!(snapshot.tokens[0].kind, TokenKind::Heading2);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.emitter.autosaves(), vec!["== Other"]);
    assert_eq!(h.factory.posted(), vec!["= Same", "== Other"]);
}

#[tokio::test(start_paused = true)]
async fn test_update_preview_replaces_surface() {
    let h = mount(Script::Silent, "", None);

    h.handle.update_preview("<svg>server</svg>").await.unwrap();
    h.handle.snapshot().await.unwrap();
    assert_eq!(preview_svg(&h.handle).as_deref(), Some("<svg>server</svg>"));
}

#[tokio::test(start_paused = true)]
async fn test_preview_push() {
    let mut config = EditorConfig::default();
    config.preview.push = true;
    let h = mount_with(config, Script::Echo, "= Hi", None);

    sleep(Duration::from_millis(150)).await;
    assert_eq!(
        h.emitter.events(),
        vec![
            OutboundEvent::WorkerHealth(WorkerHealth::Ready),
            OutboundEvent::Preview {
                svg: "<svg>= Hi</svg>".into()
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rejected_edit_leaves_document() {
    let h = mount(Script::Echo, "abc", None);

    let err = h.handle.edit(Change::delete(2..10)).await.unwrap_err();
    assert!(matches!(
        err,
        EditorError::Document(DocumentError::OutOfBounds { .. })
    ));
    assert_eq!(h.handle.edit(Change::insert(1, "")).await.unwrap(), None);

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.text, "abc");
    assert_eq!(snapshot.revision, 0);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_cancels_pending_autosave() {
    let h = mount(Script::Echo, "", Some("doc-1"));

    h.handle.edit(Change::insert(0, "unsaved")).await.unwrap();
    h.handle.unmount().await;
    sleep(Duration::from_secs(2)).await;

    assert!(h.emitter.autosaves().is_empty());
    assert!(matches!(
        h.handle.edit(Change::insert(0, "x")).await,
        Err(EditorError::Gone)
    ));
    // Second unmount is a no-op.
    h.handle.unmount().await;
}
