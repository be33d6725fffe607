//! One WebSocket connection = one editor session.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver};
use tokio::runtime::Handle;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::emitter::{ChannelEmitter, EventEmitter};
use super::message::{HostEvent, OutboundEvent, unescape_content};
use crate::actor::messages::EditorMsg;
use crate::actor::worker::WorkerFactory;
use crate::actor::{Editor, EditorHandle, MountOptions};
use crate::config::EditorConfig;
use crate::document::Change;

/// Poll interval of the connection loop.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Shared by every connection of a server.
pub struct ClientContext {
    pub config: Arc<EditorConfig>,
    pub factory: Arc<dyn WorkerFactory>,
    /// Runtime the editor actors are spawned on
    pub runtime: Handle,
}

/// Serve one connection until it closes. Runs on its own thread.
pub(super) fn serve_client(stream: TcpStream, ctx: Arc<ClientContext>) {
    // Keep blocking mode during handshake, switch to non-blocking after
    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            crate::log!("serve"; "handshake failed: {}", e);
            return;
        }
    };
    let _ = ws.get_ref().set_nonblocking(true);

    let Some(connected) = OutboundEvent::connected().to_json() else {
        return;
    };
    if let Err(e) = ws.send(Message::Text(connected.into())) {
        crate::log!("serve"; "failed to send connected message: {}", e);
        return;
    }

    let (out_tx, out_rx) = channel::unbounded();
    let mut session = Session::new(ctx, Arc::new(ChannelEmitter::new(out_tx)));

    while !crate::core::is_shutdown() {
        if !flush_outbound(&mut ws, &out_rx) {
            break;
        }

        match ws.read() {
            Ok(Message::Text(text)) => match HostEvent::from_json(&text) {
                Some(event) => session.dispatch(event),
                None => crate::debug!("serve"; "ignoring message: {}", text),
            },
            Ok(Message::Close(_)) => break,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                crate::debug!("serve"; "client disconnected: {}", e);
                break;
            }
            _ => {}
        }
    }

    session.close();
    crate::debug!("serve"; "connection closed");
}

/// Send every queued outbound event. Returns `false` if the client is gone.
fn flush_outbound(ws: &mut WebSocket<TcpStream>, rx: &Receiver<OutboundEvent>) -> bool {
    for json in rx.try_iter().filter_map(|event| event.to_json()) {
        match ws.send(Message::Text(json.into())) {
            Ok(()) => {}
            // Buffered by tungstenite, written on the next flush
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => {
                crate::debug!("serve"; "send failed: {}", e);
                return false;
            }
        }
    }
    match ws.flush() {
        Err(tungstenite::Error::Io(ref e)) if e.kind() != std::io::ErrorKind::WouldBlock => false,
        Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => false,
        _ => true,
    }
}

/// Editor bookkeeping of one connection.
pub(super) struct Session {
    ctx: Arc<ClientContext>,
    emitter: Arc<dyn EventEmitter>,
    editor: Option<EditorHandle>,
    file_id: Option<String>,
}

impl Session {
    pub(super) fn new(ctx: Arc<ClientContext>, emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            ctx,
            emitter,
            editor: None,
            file_id: None,
        }
    }

    pub(super) fn dispatch(&mut self, event: HostEvent) {
        let msg = match event {
            HostEvent::Mount { content, file_id } => {
                let content = unescape_content(content.as_deref().unwrap_or_default());
                self.mount(content, file_id);
                return;
            }
            HostEvent::Edit { from, to, insert } => EditorMsg::Edit {
                change: Change { from, to, insert },
                reply: None,
            },
            HostEvent::ContentUpdated { content } => EditorMsg::ContentUpdated { content },
            HostEvent::UpdatePreview { svg } => EditorMsg::UpdatePreview { svg },
        };

        let Some(editor) = &self.editor else {
            crate::debug!("serve"; "no editor mounted, dropping {:?}", msg);
            return;
        };
        if editor.dispatch_blocking(msg).is_err() {
            crate::log!("serve"; "editor stopped unexpectedly");
            self.editor = None;
        }
    }

    /// Same file: fold the content in. Otherwise start over.
    fn mount(&mut self, content: String, file_id: Option<String>) {
        if let Some(editor) = &self.editor
            && self.file_id == file_id
        {
            let msg = EditorMsg::ContentUpdated {
                content: content.clone(),
            };
            if editor.dispatch_blocking(msg).is_ok() {
                return;
            }
        }

        self.close();
        crate::debug!("serve"; "mount {:?}", file_id);

        let _guard = self.ctx.runtime.enter();
        self.editor = Some(Editor::mount(
            Arc::clone(&self.ctx.config),
            MountOptions {
                initial_text: content,
                file_id: file_id.clone(),
                emitter: Some(Arc::clone(&self.emitter)),
            },
            Arc::clone(&self.ctx.factory),
        ));
        self.file_id = file_id;
    }

    pub(super) fn editor(&self) -> Option<&EditorHandle> {
        self.editor.as_ref()
    }

    /// Unmount the current editor, if any.
    pub(super) fn close(&mut self) {
        if let Some(editor) = self.editor.take() {
            self.ctx.runtime.block_on(editor.unmount());
        }
        self.file_id = None;
    }
}
