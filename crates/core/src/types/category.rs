//! Dietary category of a catalog item.

use serde::{Deserialize, Serialize};

/// Veg / non-veg marker carried by every menu item.
///
/// Filtering is exact and case-insensitive on the wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    #[serde(rename = "veg")]
    Veg,
    #[serde(rename = "non-veg")]
    NonVeg,
}

impl Category {
    /// Wire token for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Veg => "veg",
            Self::NonVeg => "non-veg",
        }
    }

    /// Parse a filter token case-insensitively; anything unrecognised means
    /// "no category filter".
    #[must_use]
    pub fn parse_filter(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "veg" => Some(Self::Veg),
            "non-veg" => Some(Self::NonVeg),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tokens() {
        assert_eq!(
            serde_json::to_string(&Category::NonVeg).unwrap(),
            "\"non-veg\""
        );
        let parsed: Category = serde_json::from_str("\"veg\"").unwrap();
        assert_eq!(parsed, Category::Veg);
    }

    #[test]
    fn test_filter_parse_case_insensitive() {
        assert_eq!(Category::parse_filter("VEG"), Some(Category::Veg));
        assert_eq!(Category::parse_filter("Non-Veg"), Some(Category::NonVeg));
        assert_eq!(Category::parse_filter("all"), None);
    }
}
