//! Outbound event transport.

use crossbeam::channel::Sender;

use super::message::OutboundEvent;

/// Pushes events to the host. Absent emitter = no outbound traffic.
pub trait EventEmitter: Send + Sync {
    fn push_event(&self, event: OutboundEvent);
}

/// Emitter backed by a channel, drained by the connection thread.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: Sender<OutboundEvent>,
}

impl ChannelEmitter {
    pub fn new(tx: Sender<OutboundEvent>) -> Self {
        Self { tx }
    }
}

impl EventEmitter for ChannelEmitter {
    fn push_event(&self, event: OutboundEvent) {
        if self.tx.send(event).is_err() {
            crate::debug!("host"; "connection gone, event discarded");
        }
    }
}
