/// Application name
pub const APP_NAME: &str = "pluglist";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Module root, relative to the host installation
pub const DEFAULT_MODULE_SUBDIR: &str = "user/plugin";

/// Directory name prefix marking a disabled module folder
pub const DEFAULT_DISABLE_PREFIX: &str = "_";

/// Extension of an active module binary
pub const DEFAULT_ACTIVE_EXTENSION: &str = ".dll";

/// Suffix appended after the binary extension to disable it
pub const DEFAULT_DISABLED_SUFFIX: &str = ".disabled";

/// Folder name the manager itself is installed under
pub const SELF_MODULE_NAME: &str = "PluginList";

/// Binary file name of the manager itself
pub const SELF_BINARY_NAME: &str = "PluginList.dll";

/// Base name of the deferred script written to the temp directory
pub const DEFERRED_SCRIPT_NAME: &str = "pluglist_deferred";

/// Seconds between host liveness polls inside the deferred script
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Seconds to wait after host exit so file handles are released
pub const DEFAULT_GRACE_INTERVAL_SECS: u64 = 1;

/// Sidecar metadata file consulted when a binary carries no version strings
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Configuration file looked up beside the host when `--config` is absent
pub const DEFAULT_CONFIG_FILE_NAME: &str = "pluglist.toml";
