//! `[worker]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [worker.restart]
//! mode = "backoff"      # "backoff" or "never"
//! initial_ms = 250      # First restart delay, doubled per consecutive fault
//! max_ms = 8000         # Delay cap
//! max_restarts = 5      # Consecutive restarts before giving up (0 = unlimited)
//! ```

use serde::{Deserialize, Serialize};

use crate::actor::worker::RestartPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub restart: RestartConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartMode {
    #[default]
    Backoff,
    Never,
}

/// Supervision of a faulted compile worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub mode: RestartMode,
    pub initial_ms: u64,
    pub max_ms: u64,
    pub max_restarts: u32,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            mode: RestartMode::Backoff,
            initial_ms: 250,
            max_ms: 8_000,
            max_restarts: 5,
        }
    }
}

impl RestartConfig {
    pub fn policy(&self) -> RestartPolicy {
        match self.mode {
            RestartMode::Never => RestartPolicy::Never,
            RestartMode::Backoff => RestartPolicy::Backoff {
                initial_ms: self.initial_ms,
                max_ms: self.max_ms,
                max_restarts: (self.max_restarts > 0).then_some(self.max_restarts),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::actor::worker::RestartPolicy;
    use crate::config::test_parse_config;

    #[test]
    fn test_restart_defaults_match_policy_default() {
        let config = test_parse_config("");
        assert_eq!(config.worker.restart.policy(), RestartPolicy::default());
    }

    #[test]
    fn test_restart_never() {
        let config = test_parse_config("[worker.restart]\nmode = \"never\"");
        assert_eq!(config.worker.restart.policy(), RestartPolicy::Never);
    }

    #[test]
    fn test_restart_unlimited() {
        let config = test_parse_config("[worker.restart]\ninitial_ms = 50\nmax_restarts = 0");
        assert_eq!(
            config.worker.restart.policy(),
            RestartPolicy::Backoff {
                initial_ms: 50,
                max_ms: 8_000,
                max_restarts: None,
            }
        );
    }
}
