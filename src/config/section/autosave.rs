//! `[autosave]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [autosave]
//! enabled = true       # Emit autosave events to the host
//! debounce_ms = 500    # Quiet period after the last change
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Debounced autosave settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Autosave still needs a file id and an emitter at mount time.
    pub enabled: bool,

    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 500,
        }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_autosave_config() {
        let config = test_parse_config("[autosave]\nenabled = false\ndebounce_ms = 750");
        assert!(!config.autosave.enabled);
        assert_eq!(config.autosave.debounce().as_millis(), 750);
    }

    #[test]
    fn test_autosave_defaults() {
        let config = test_parse_config("");
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.debounce_ms, 500);
    }
}
