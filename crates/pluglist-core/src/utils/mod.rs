//! Small filesystem and name-matching helpers shared across subsystems.
pub mod fs;

pub use fs::{any_file_matches, find_files, list_files};

/// Case-insensitive (ASCII) `ends_with`
pub fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Case-insensitive (ASCII) `starts_with`
pub fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Strip `suffix` from the end of `name`, ignoring ASCII case.
pub fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    if ends_with_ignore_case(name, suffix) {
        Some(&name[..name.len() - suffix.len()])
    } else {
        None
    }
}

/// Case-insensitive substring test used by the live search filter
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests;
