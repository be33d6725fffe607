//! Configuration section definitions.

mod autosave;
mod compile;
mod preview;
mod serve;
mod worker;

pub use autosave::AutosaveConfig;
pub use compile::CompileConfig;
pub use preview::PreviewConfig;
pub use serve::ServeConfig;
pub use worker::{RestartConfig, RestartMode, WorkerConfig};
