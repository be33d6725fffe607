//! Keeping the editor in step with the outside world.
//!
//! - [`preview`]: the observable surface holding the latest artifact
//! - [`content`]: folding externally pushed text into the document

pub mod content;
pub mod preview;

pub use content::reconcile;
pub use preview::{PreviewSurface, apply_artifact};
