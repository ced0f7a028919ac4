//! Embed configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields a working configuration:
//!
//! ```yaml
//! width: 480px
//! height: 270px
//! script_id: yt-api-script
//! script_src: https://www.youtube.com/iframe_api
//! ready_timeout_ms: 10000   # optional; omit to wait indefinitely
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_WIDTH: &str = "480px";
pub const DEFAULT_HEIGHT: &str = "270px";
pub const DEFAULT_SCRIPT_ID: &str = "yt-api-script";
pub const DEFAULT_SCRIPT_SRC: &str = "https://www.youtube.com/iframe_api";

/// Settings shared by the bootstrap gate and every widget it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Widget display width, passed through verbatim.
    pub width: String,
    /// Widget display height, passed through verbatim.
    pub height: String,
    /// Element id of the loader script; injection is skipped if it exists.
    pub script_id: String,
    /// URL of the platform loader script.
    pub script_src: String,
    /// Give up waiting for platform readiness after this many milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_timeout_ms: Option<u64>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH.to_owned(),
            height: DEFAULT_HEIGHT.to_owned(),
            script_id: DEFAULT_SCRIPT_ID.to_owned(),
            script_src: DEFAULT_SCRIPT_SRC.to_owned(),
            ready_timeout_ms: None,
        }
    }
}

impl EmbedConfig {
    /// Load and validate a config file.
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` (with path + line context) if the YAML is malformed.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // An empty file is valid and means "all defaults".
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no widget platform could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("width", &self.width),
            ("height", &self.height),
            ("script_id", &self.script_id),
            ("script_src", &self.script_src),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("`{field}` must not be empty")));
            }
        }
        if self.ready_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "`ready_timeout_ms` must be positive; omit it to wait indefinitely".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout_ms.map(Duration::from_millis)
    }
}
