//! Static identity from file metadata.
//!
//! Windows-style module binaries embed a version resource whose string
//! table carries `ProductName` and `FileDescription`. Each entry is a
//! `String` block: a 6-byte header (`wLength`, `wValueLength`, `wType`), a
//! NUL-terminated UTF-16LE key, padding to a 32-bit boundary, then the
//! UTF-16LE value. The reader scans for the key rather than walking the
//! whole PE resource tree.
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde::Deserialize;

use crate::identity::{IdentityProvider, ModuleCandidate};
use crate::kernel::constants::MANIFEST_FILE_NAME;
use crate::repository::conventions::Conventions;
use crate::utils::fs::{file_name_str, list_files};

/// Binaries larger than this are not scanned
const MAX_SCAN_BYTES: u64 = 64 * 1024 * 1024;

/// `wType` of a text-valued version block
const VERSION_BLOCK_TEXT: u16 = 1;

/// Product strings read from a binary's version resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionStrings {
    pub product_name: Option<String>,
    pub file_description: Option<String>,
}

impl VersionStrings {
    /// Product name if non-blank, else file description
    pub fn best_name(self) -> Option<String> {
        self.product_name.or(self.file_description)
    }
}

/// Extract `ProductName` / `FileDescription` from raw binary bytes
pub fn read_version_strings(bytes: &[u8]) -> VersionStrings {
    VersionStrings {
        product_name: find_version_value(bytes, "ProductName"),
        file_description: find_version_value(bytes, "FileDescription"),
    }
}

fn utf16_key(key: &str) -> Vec<u8> {
    key.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    bytes.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn find_version_value(bytes: &[u8], key: &str) -> Option<String> {
    let needle = utf16_key(key);
    let mut from = 0;

    while let Some(rel) = bytes.get(from..).and_then(|rest| find_subslice(rest, &needle)) {
        let key_pos = from + rel;
        from = key_pos + 2;

        if key_pos < 6 || key_pos % 2 != 0 {
            continue;
        }
        let header = key_pos - 6;
        let (Some(value_words), Some(block_type)) = (read_u16(bytes, header + 2), read_u16(bytes, header + 4)) else {
            continue;
        };
        if block_type != VERSION_BLOCK_TEXT || value_words == 0 {
            continue;
        }

        let mut value_pos = key_pos + needle.len();
        while (value_pos - header) % 4 != 0 {
            value_pos += 1;
        }
        let end = (value_pos + usize::from(value_words) * 2).min(bytes.len());
        let Some(raw) = bytes.get(value_pos..end) else {
            continue;
        };

        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .take_while(|&u| u != 0)
            .collect();
        let value = String::from_utf16_lossy(&units);
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    None
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModuleManifest {
    name: Option<String>,
    description: Option<String>,
}

/// `name`, else `description`, from a plugin manifest file
fn read_manifest_name(path: &Path) -> Option<String> {
    let data = fs::read_to_string(path).ok()?;
    let manifest: ModuleManifest = match serde_json::from_str(&data) {
        Ok(m) => m,
        Err(e) => {
            debug!("Ignoring unreadable manifest {}: {}", path.display(), e);
            return None;
        }
    };
    let non_blank = |s: String| if s.trim().is_empty() { None } else { Some(s) };
    manifest.name.and_then(non_blank).or_else(|| manifest.description.and_then(non_blank))
}

/// Resolves names from the module's binary version strings or its manifest
#[derive(Debug, Clone, Default)]
pub struct BinaryMetadataProvider {
    conventions: Conventions,
}

impl BinaryMetadataProvider {
    pub fn new(conventions: Conventions) -> Self {
        Self { conventions }
    }

    /// The binary that speaks for a module: the file itself, the folder's
    /// same-named binary, or the first binary directly inside the folder.
    pub fn representative_binary(&self, candidate: &ModuleCandidate) -> Option<PathBuf> {
        let location = &candidate.location;
        if !candidate.is_directory {
            return location.is_file().then(|| location.clone());
        }

        let folder = file_name_str(location)?;
        let bare = self.conventions.enabled_dir_name(folder);
        let active = &self.conventions.active_extension;
        let disabled = self.conventions.disabled_extension();
        let same_named = [
            format!("{}{}", folder, active),
            format!("{}{}", bare, active),
            format!("{}{}", folder, disabled),
            format!("{}{}", bare, disabled),
        ];
        if let Some(found) = same_named.iter().map(|n| location.join(n)).find(|p| p.is_file()) {
            return Some(found);
        }

        let binaries = list_files(location, &|p: &Path| {
            file_name_str(p).is_some_and(|n| self.conventions.is_any_binary_name(n))
        })
        .ok()?;
        // Active binaries before disabled ones
        binaries
            .iter()
            .find(|p| file_name_str(p).is_some_and(|n| self.conventions.is_active_binary_name(n)))
            .or_else(|| binaries.first())
            .cloned()
    }

    fn manifest_path(candidate: &ModuleCandidate) -> PathBuf {
        if candidate.is_directory {
            candidate.location.join(MANIFEST_FILE_NAME)
        } else {
            let mut name = candidate.location.as_os_str().to_owned();
            name.push(".");
            name.push(MANIFEST_FILE_NAME);
            PathBuf::from(name)
        }
    }
}

impl IdentityProvider for BinaryMetadataProvider {
    fn name(&self) -> &str {
        "binary-metadata"
    }

    fn try_get_declared_name(&self, candidate: &ModuleCandidate) -> Option<String> {
        if let Some(binary) = self.representative_binary(candidate) {
            let too_large = !fs::metadata(&binary).is_ok_and(|m| m.len() <= MAX_SCAN_BYTES);
            if too_large {
                trace!("Skipping version scan of {}", binary.display());
            } else if let Ok(bytes) = fs::read(&binary) {
                if let Some(name) = read_version_strings(&bytes).best_name() {
                    return Some(name);
                }
            }
        }
        read_manifest_name(&Self::manifest_path(candidate))
    }
}
