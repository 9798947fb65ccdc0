use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-zA-Z0-9]+$").expect("title pattern is valid"));

/// Check whether a raw path segment is usable as a page title
pub fn is_valid_title(candidate: &str) -> bool {
    TITLE_PATTERN.is_match(candidate)
}

/// A validated page title. Only ASCII letters and digits, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    pub fn parse(candidate: &str) -> Option<Self> {
        is_valid_title(candidate).then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the file backing this page
    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, crate::services::PAGE_EXTENSION)
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
