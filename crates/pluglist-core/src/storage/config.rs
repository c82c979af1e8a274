use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::kernel::constants;
use crate::planner::script::ScriptDialect;
use crate::repository::conventions::Conventions;
use crate::repository::discovery::SelfIdentity;
use crate::repository::module::DisplayMode;
use crate::repository::view::SortOrder;
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Settings for the generated post-exit script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Base file name inside the temp directory; the dialect adds the extension
    pub file_name: String,
    /// Seconds between host liveness polls
    pub poll_interval_secs: u64,
    /// Seconds to wait after the host is gone before touching files
    pub grace_interval_secs: u64,
    /// Script flavour; `None` picks the one native to this platform
    pub dialect: Option<ScriptDialect>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            file_name: constants::DEFERRED_SCRIPT_NAME.to_string(),
            poll_interval_secs: constants::DEFAULT_POLL_INTERVAL_SECS,
            grace_interval_secs: constants::DEFAULT_GRACE_INTERVAL_SECS,
            dialect: None,
        }
    }
}

impl ScriptConfig {
    pub fn dialect(&self) -> ScriptDialect {
        self.dialect.unwrap_or_else(ScriptDialect::native)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn grace_interval(&self) -> Duration {
        Duration::from_secs(self.grace_interval_secs)
    }

    /// Full path of the script file inside the platform temp directory
    pub fn script_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("{}.{}", self.file_name, self.dialect().extension()))
    }
}

/// Manager configuration, usually read from `pluglist.toml` beside the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Host installation directory; defaults to the directory of the running executable
    pub host_base: Option<PathBuf>,
    /// Module root relative to `host_base`
    pub module_subdir: PathBuf,
    /// Naming conventions marking modules disabled
    pub conventions: Conventions,
    /// How the manager recognises its own module
    pub self_identity: SelfIdentity,
    pub script: ScriptConfig,
    pub display_mode: DisplayMode,
    pub sort: SortOrder,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            host_base: None,
            module_subdir: PathBuf::from(constants::DEFAULT_MODULE_SUBDIR),
            conventions: Conventions::default(),
            self_identity: SelfIdentity::default(),
            script: ScriptConfig::default(),
            display_mode: DisplayMode::default(),
            sort: SortOrder::default(),
        }
    }
}

impl ManagerConfig {
    /// Load a configuration file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, StorageSystemError> {
        if !path.is_file() {
            return Err(StorageSystemError::FileNotFound(path.to_path_buf()));
        }
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        let data = std::fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_config", path.to_path_buf()))?;
        let config = Self::deserialize(&data, format)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Like [`load`](Self::load) but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, StorageSystemError> {
        match Self::load(path) {
            Err(StorageSystemError::FileNotFound(_)) => {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, StorageSystemError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| {
                StorageSystemError::DeserializationError { format: "json".into(), source: Box::new(e) }
            }),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| {
                StorageSystemError::DeserializationError { format: "yaml".into(), source: Box::new(e) }
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| {
                StorageSystemError::DeserializationError { format: "toml".into(), source: Box::new(e) }
            }),
        }
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, StorageSystemError> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| {
                StorageSystemError::SerializationError { format: "json".into(), source: Box::new(e) }
            }),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| {
                StorageSystemError::SerializationError { format: "yaml".into(), source: Box::new(e) }
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| {
                StorageSystemError::SerializationError { format: "toml".into(), source: Box::new(e) }
            }),
        }
    }

    /// Host installation directory
    pub fn host_base(&self) -> PathBuf {
        if let Some(base) = &self.host_base {
            return base.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// `<host-base>/user/plugin` unless overridden
    pub fn module_root(&self) -> PathBuf {
        self.host_base().join(&self.module_subdir)
    }
}
