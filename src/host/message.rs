//! Host Event Protocol
//!
//! JSON messages exchanged with the host page:
//! `{"event": "<name>", "payload": {...}}`.
//!
//! # Inbound
//!
//! - `mount`: mount (or re-mount) the connection's editor
//! - `edit`: local edit, byte range replaced by `insert`
//! - `content_updated`: collaborative full-text update
//! - `update_preview`: server-rendered SVG
//!
//! # Outbound
//!
//! - `connected`: handshake done
//! - `autosave`: debounced document content
//! - `preview`: worker render (only with `[preview] push = true`)
//! - `compile_error`, `worker_health`, `compile_dropped`: diagnostics

use serde::{Deserialize, Serialize};

use crate::actor::worker::WorkerHealth;

/// Event received from the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum HostEvent {
    Mount {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        file_id: Option<String>,
    },
    Edit {
        from: usize,
        to: usize,
        #[serde(default)]
        insert: String,
    },
    ContentUpdated {
        content: String,
    },
    UpdatePreview {
        svg: String,
    },
}

impl HostEvent {
    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

/// Event pushed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },
    Autosave {
        file_id: String,
        content: String,
    },
    Preview {
        svg: String,
    },
    CompileError {
        message: String,
    },
    WorkerHealth(WorkerHealth),
    /// A compile request found no ready worker and was discarded
    CompileDropped {},
}

impl OutboundEvent {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON string
    /// Serialize to JSON. `None` (logged) if the event cannot be encoded.
    pub fn to_json(&self) -> Option<String> {
        encode(self)
    }
}

fn encode<T: Serialize>(event: &T) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            crate::log!("serve"; "failed to encode event: {}", e);
            None
        }
    }
}

/// Undo the `\n` escaping the host applies to content embedded in markup.
pub fn unescape_content(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inbound() {
        assert_eq!(
            HostEvent::from_json(r#"{"event":"edit","payload":{"from":0,"to":1,"insert":"=="}}"#),
            Some(HostEvent::Edit {
                from: 0,
                to: 1,
                insert: "==".into()
            })
        );
        assert_eq!(
            HostEvent::from_json(r#"{"event":"mount","payload":{"file_id":"doc-1"}}"#),
            Some(HostEvent::Mount {
                content: None,
                file_id: Some("doc-1".into())
            })
        );
        assert_eq!(
            HostEvent::from_json(r#"{"event":"update_preview","payload":{"svg":"<svg/>"}}"#),
            Some(HostEvent::UpdatePreview {
                svg: "<svg/>".into()
            })
        );
        assert_eq!(HostEvent::from_json(r#"{"event":"reload"}"#), None);
    }

    #[test]
    fn test_outbound_wire_shape() {
        let autosave = OutboundEvent::Autosave {
            file_id: "doc-1".into(),
            content: "=== Hi".into(),
        };
        assert_eq!(
            autosave.to_json().unwrap(),
            r#"{"event":"autosave","payload":{"file_id":"doc-1","content":"=== Hi"}}"#
        );

        assert_eq!(
            OutboundEvent::CompileDropped {}.to_json().unwrap(),
            r#"{"event":"compile_dropped","payload":{}}"#
        );
        assert_eq!(
            OutboundEvent::WorkerHealth(WorkerHealth::Ready).to_json().unwrap(),
            r#"{"event":"worker_health","payload":{"status":"ready"}}"#
        );
    }

    #[test]
    fn test_connected_carries_version() {
        let json = OutboundEvent::connected().to_json().unwrap();
        assert!(json.starts_with(r#"{"event":"connected","payload":{"version":"#));
    }

    #[test]
    fn test_unencodable_event_is_not_sent() {
        struct Unencodable;

        impl Serialize for Unencodable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("not representable"))
            }
        }

        assert_eq!(encode(&Unencodable), None);
    }

    #[test]
    fn test_unescape_content() {
        assert_eq!(unescape_content(r"= Title\nBody"), "= Title\nBody");
        assert_eq!(unescape_content("plain"), "plain");
    }
}
