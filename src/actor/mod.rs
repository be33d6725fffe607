//! Actor System for the Editor Pipeline
//!
//! Message-passing concurrency, one actor per mounted editor:
//!
//! ```text
//! EditorHandle --> EditorActor --> compile worker (thread)
//!  (caller)        (document,        (CompileBackend)
//!                   autosave)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for actor and worker communication
//! - `editor` - Editor actor: edit pipeline, autosave, preview routing
//! - `worker` - Compile worker lifecycle and supervision

pub mod editor;
pub mod messages;
pub mod worker;

pub use editor::{Editor, EditorError, EditorHandle, MountOptions, Snapshot};
