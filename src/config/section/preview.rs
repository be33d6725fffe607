//! `[preview]` section configuration.
//!
//! ```toml
//! [preview]
//! push = false   # Also send every worker render to the host as a `preview` event
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub push: bool,
}
