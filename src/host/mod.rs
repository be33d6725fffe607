//! Host transport.
//!
//! The host page talks to one editor per WebSocket connection using the
//! JSON events in [`message`].

pub mod client;
pub mod emitter;
pub mod message;
pub mod server;

pub use emitter::{ChannelEmitter, EventEmitter};
pub use message::{HostEvent, OutboundEvent, unescape_content};
pub use server::start_host_server;
