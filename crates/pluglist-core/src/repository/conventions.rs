use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::utils::{ends_with_ignore_case, strip_suffix_ignore_case};

/// Naming conventions that mark modules active or disabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Prefix on a folder name, e.g. `_MyPlugin`
    pub disable_prefix: String,
    /// Extension of a loadable binary, e.g. `.dll`
    pub active_extension: String,
    /// Appended after the binary extension, e.g. `.dll.disabled`
    pub disabled_suffix: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            disable_prefix: constants::DEFAULT_DISABLE_PREFIX.to_string(),
            active_extension: constants::DEFAULT_ACTIVE_EXTENSION.to_string(),
            disabled_suffix: constants::DEFAULT_DISABLED_SUFFIX.to_string(),
        }
    }
}

impl Conventions {
    /// Extension of a disabled binary, e.g. `.dll.disabled`
    pub fn disabled_extension(&self) -> String {
        format!("{}{}", self.active_extension, self.disabled_suffix)
    }

    pub fn is_disabled_dir_name(&self, name: &str) -> bool {
        !self.disable_prefix.is_empty() && name.starts_with(&self.disable_prefix)
    }

    /// A file carrying the disabled suffix
    pub fn is_disabled_file_name(&self, name: &str) -> bool {
        !self.disabled_suffix.is_empty() && ends_with_ignore_case(name, &self.disabled_suffix)
    }

    pub fn is_active_binary_name(&self, name: &str) -> bool {
        ends_with_ignore_case(name, &self.active_extension)
    }

    /// A file directly under the module root that counts as a module
    pub fn is_module_file_name(&self, name: &str) -> bool {
        self.is_active_binary_name(name) || self.is_disabled_file_name(name)
    }

    /// A binary inside a module folder, active or disabled
    pub fn is_any_binary_name(&self, name: &str) -> bool {
        self.is_active_binary_name(name)
            || ends_with_ignore_case(name, &self.disabled_extension())
    }

    /// Folder name with every leading disable prefix removed
    pub fn enabled_dir_name<'a>(&self, name: &'a str) -> &'a str {
        if self.disable_prefix.is_empty() {
            return name;
        }
        name.trim_start_matches(self.disable_prefix.as_str())
    }

    pub fn disabled_dir_name(&self, name: &str) -> String {
        format!("{}{}", self.disable_prefix, name)
    }

    /// File name with the disabled suffix removed; unchanged if it has none
    pub fn enabled_file_name<'a>(&self, name: &'a str) -> &'a str {
        strip_suffix_ignore_case(name, &self.disabled_suffix).unwrap_or(name)
    }

    pub fn disabled_file_name(&self, name: &str) -> String {
        format!("{}{}", name, self.disabled_suffix)
    }

    /// Whether folder `name` is `self_name`, ignoring case and the disable prefix
    pub(crate) fn same_module_name(&self, name: &str, self_name: &str) -> bool {
        !self_name.is_empty() && self.enabled_dir_name(name).eq_ignore_ascii_case(self_name)
    }
}
