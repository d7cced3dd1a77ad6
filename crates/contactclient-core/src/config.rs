use crate::error::{ContactClientError, Result};
use crate::integration::IntegrationSettings;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// LockConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Age after which a run marker is treated as abandoned and reclaimed.
    /// `0` disables expiry.
    #[serde(default = "default_lock_timeout")]
    pub timeout_seconds: u64,
}

fn default_lock_timeout() -> u64 {
    1800
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_lock_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Settings for the contact client integration. Absent means the
    /// integration is not installed and cannot be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<IntegrationSettings>,
    #[serde(default)]
    pub lock: LockConfig,
}

impl Config {
    /// The config written by `contactclient init`.
    pub fn initial() -> Self {
        Self {
            integration: Some(IntegrationSettings { published: true }),
            lock: LockConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        if !paths::data_dir(root).is_dir() {
            return Err(ContactClientError::NotInitialized);
        }
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }
}
