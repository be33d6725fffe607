//! Actor Message Definitions
//!
//! ```text
//! EditorHandle --EditorMsg--> EditorActor --WorkerRequest--> compile worker
//!                                  ^                              |
//!                                  +--------WorkerEvent-----------+
//! ```
//!
//! `WorkerRequest`/`WorkerResponse` are the compile protocol; their serde
//! form is the wire shape (`{"type":"compile","content":...}`,
//! `{"type":"render","data":{"svg":...}}`, `{"type":"error","data":{...}}`).

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::document::{Change, DocumentError};

use super::editor::Snapshot;

// =============================================================================
// Compile protocol
// =============================================================================

/// Request to the compile worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerRequest {
    /// Compile the whole document
    Compile { content: String },
}

/// Reply from the compile worker, one per request, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum WorkerResponse {
    Render { svg: String },
    Error { message: String },
}

/// Everything a worker process reports back, stamped with the generation
/// of the process that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Process constructed and accepting requests
    Ready { generation: u64 },
    /// Protocol reply
    Response {
        generation: u64,
        response: WorkerResponse,
    },
    /// The process itself failed and is gone
    Fault { generation: u64, message: String },
}

impl WorkerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Ready { generation }
            | Self::Response { generation, .. }
            | Self::Fault { generation, .. } => *generation,
        }
    }
}

// =============================================================================
// EditorActor Messages
// =============================================================================

/// Messages to Editor Actor
#[derive(Debug)]
pub enum EditorMsg {
    /// Local edit; replies with the new revision (None for an empty change)
    Edit {
        change: Change,
        reply: Option<oneshot::Sender<Result<Option<u64>, DocumentError>>>,
    },
    /// Externally pushed content (collaborative update)
    ContentUpdated { content: String },
    /// Artifact produced elsewhere (server-side render)
    UpdatePreview { svg: String },
    /// Make sure a compile worker exists
    EnsureWorker { reply: Option<oneshot::Sender<()>> },
    /// Read current state
    Snapshot(oneshot::Sender<Snapshot>),
    /// Tear down and stop
    Unmount { reply: Option<oneshot::Sender<()>> },
}
