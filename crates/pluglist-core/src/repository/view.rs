use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::repository::module::Module;
use crate::utils::contains_ignore_case;

/// Primary sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Display name, case-insensitive
    #[default]
    Name,
    /// Enabled/disabled status, then display name
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort key and direction, selectable independently.
///
/// Written as `name-asc`, `name-desc`, `status-asc` or `status-desc` in
/// configuration files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Compare two modules. Ascending status order puts enabled modules first.
    pub fn compare(&self, a: &Module, b: &Module) -> Ordering {
        let mut result = Ordering::Equal;
        if self.key == SortKey::Status {
            result = a.is_disabled().cmp(&b.is_disabled());
        }
        if result == Ordering::Equal {
            result = compare_names(&a.display_name(), &b.display_name());
        }
        match self.direction {
            SortDirection::Ascending => result,
            SortDirection::Descending => result.reverse(),
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self.key {
            SortKey::Name => "name",
            SortKey::Status => "status",
        };
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}-{}", key, direction)
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid sort order '{}', expected e.g. name-asc", s))?;
        let key = match key.to_lowercase().as_str() {
            "name" => SortKey::Name,
            "status" => SortKey::Status,
            other => return Err(format!("unknown sort key '{}'", other)),
        };
        let direction = match direction.to_lowercase().as_str() {
            "asc" | "ascending" => SortDirection::Ascending,
            "desc" | "descending" => SortDirection::Descending,
            other => return Err(format!("unknown sort direction '{}'", other)),
        };
        Ok(Self { key, direction })
    }
}

impl TryFrom<String> for SortOrder {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.to_string()
    }
}

/// Live search term and ordering applied to the module collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSettings {
    pub search_term: String,
    pub sort: SortOrder,
}

impl ViewSettings {
    /// Case-insensitive substring match on the display name; empty matches all
    pub fn matches(&self, module: &Module) -> bool {
        contains_ignore_case(&module.display_name(), &self.search_term)
    }

    /// Filter then sort, borrowing from `modules`
    pub fn apply<'a>(&self, modules: &'a [Module]) -> Vec<&'a Module> {
        let mut visible: Vec<&Module> = modules.iter().filter(|m| self.matches(m)).collect();
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}
