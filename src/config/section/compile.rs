//! `[compile]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [compile]
//! retry_delay_ms = 100   # Re-check delay when no worker is ready yet
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// A request made while the worker is still starting is re-checked
    /// once after this delay, then dropped if the worker is still not ready.
    pub retry_delay_ms: u64,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self { retry_delay_ms: 100 }
    }
}

impl CompileConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
