use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::qr::{EcLevel, DEFAULT_SIZE};

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "MKQR_CONFIG";

/// Defaults for the global CLI flags. Flags given on the command line win.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub level: EcLevel,
    pub size: u32,
    pub invert: bool,
    pub small: bool,
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            level: EcLevel::M,
            size: DEFAULT_SIZE,
            invert: false,
            small: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        if cfg.size == 0 {
            return Err(Error::Config(format!("{}: size must be positive", path.display())));
        }
        Ok(cfg)
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(p));
    }
    let mut dir = dirs::config_dir().ok_or_else(|| Error::Config("cannot get config dir".into()))?;
    dir.push("mkqr");
    Ok(dir.join("config.json"))
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let s = serde_json::to_string_pretty(cfg).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, s)?;
    Ok(())
}
