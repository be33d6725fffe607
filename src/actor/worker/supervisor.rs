//! Restart policy for faulted compile workers.

use std::time::Duration;

use serde::Serialize;

/// What to do when the worker process faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Leave the worker dead until something calls `ensure_worker` again
    Never,
    /// Respawn after `initial_ms * 2^attempt`, capped at `max_ms`
    Backoff {
        initial_ms: u64,
        max_ms: u64,
        /// Give up after this many consecutive restarts (`None` = never)
        max_restarts: Option<u32>,
    },
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self::Backoff {
            initial_ms: 250,
            max_ms: 8_000,
            max_restarts: Some(5),
        }
    }
}

impl RestartPolicy {
    /// Delay before restart number `attempt` (0-based), or `None` to give up.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        match *self {
            Self::Never => None,
            Self::Backoff {
                initial_ms,
                max_ms,
                max_restarts,
            } => {
                if max_restarts.is_some_and(|max| attempt >= max) {
                    return None;
                }
                let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
                let ms = initial_ms.saturating_mul(factor).min(max_ms);
                Some(Duration::from_millis(ms))
            }
        }
    }
}

/// Worker health as reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerHealth {
    Ready,
    Restarting { attempt: u32, delay_ms: u64 },
    Down { reason: String },
}
