//! Editor configuration management for `editor.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── autosave   # [autosave]
//! │   ├── compile    # [compile]
//! │   ├── preview    # [preview]
//! │   ├── serve      # [serve]
//! │   └── worker     # [worker.restart]
//! ├── error          # ConfigError
//! └── mod.rs         # EditorConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                      |
//! |--------------------|----------------------------------------------|
//! | `[autosave]`       | Debounced autosave to the host               |
//! | `[compile]`        | Request deferral while the worker starts     |
//! | `[worker.restart]` | Supervision of a faulted compile worker      |
//! | `[preview]`        | Pushing renders back to the host             |
//! | `[serve]`          | WebSocket host transport (interface, port)   |
//!
//! The file is optional: every field has a default.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{
    AutosaveConfig, CompileConfig, PreviewConfig, RestartConfig, RestartMode, ServeConfig,
    WorkerConfig,
};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::actor::worker::WorkerSettings;
use crate::cli::{Cli, Commands};
use crate::log;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing editor.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Path the config was loaded from (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub autosave: AutosaveConfig,

    #[serde(default)]
    pub compile: CompileConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl EditorConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// A missing file is not an error: defaults apply. CLI options override
    /// file values, then the result is validated.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = Self::from_path(&cli.config)?;
        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, falling back to defaults when it does not exist.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            crate::debug!("config"; "{} not found, using defaults", path.display());
            return Ok(Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            });
        }

        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        if let Commands::Serve {
            interface, port, ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::Validation(msg.to_string()));

        if self.autosave.debounce_ms == 0 {
            return fail("autosave.debounce_ms must be greater than 0");
        }
        if self.compile.retry_delay_ms == 0 {
            return fail("compile.retry_delay_ms must be greater than 0");
        }

        let restart = &self.worker.restart;
        if restart.mode == RestartMode::Backoff {
            if restart.initial_ms == 0 {
                return fail("worker.restart.initial_ms must be greater than 0");
            }
            if restart.initial_ms > restart.max_ms {
                return fail("worker.restart.initial_ms must not exceed worker.restart.max_ms");
            }
        }

        Ok(())
    }

    /// Worker manager timing derived from `[compile]` and `[worker]`.
    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            retry_delay: self.compile.retry_delay(),
            restart: self.worker.restart.policy(),
        }
    }
}

/// Parse a config snippet, failing the test on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> EditorConfig {
    let (parsed, ignored) = EditorConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
