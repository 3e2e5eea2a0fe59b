//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use pwmerge_core::source::DEFAULT_ETC_DIR;
use pwmerge_core::{MergePolicy, SystemEntryPolicy};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "PWMERGE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub etc_dir: Option<PathBuf>,
    #[serde(default)]
    pub missing_system_entries: SystemEntryPolicy,
}

const fn default_config_version() -> u32 {
    CONFIG_VERSION
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            etc_dir: None,
            missing_system_entries: SystemEntryPolicy::default(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pwmerge").join(CONFIG_FILE_NAME))
}

impl CliConfig {
    /// Load from `--config`, then `PWMERGE_CONFIG`, then the default location.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let from_env = std::env::var_os(CONFIG_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
            if !path.exists() {
                return Err(format!("Config file {} does not exist", path.display()));
            }
            return Self::load_from_path(&path);
        }

        match default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        if config.version != CONFIG_VERSION {
            return Err(format!(
                "Unsupported config version {} at {} (expected {CONFIG_VERSION})",
                config.version,
                path.display()
            ));
        }
        Ok(config)
    }

    /// `--etc-dir` beats the config file, which beats `/etc`.
    pub fn resolve_etc_dir(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.etc_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ETC_DIR))
    }

    /// `--strict` forces the fail policy regardless of the file.
    pub const fn merge_policy(&self, strict: bool) -> MergePolicy {
        MergePolicy {
            missing_system_entries: if strict {
                SystemEntryPolicy::Fail
            } else {
                self.missing_system_entries
            },
        }
    }
}
