//! Sort specifications for queries.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

/// A sort specification consisting of a field name and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Field name to sort by.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Create an ascending sort on the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Create a descending sort on the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Parse a key such as `"age"` or `"-age"`; a leading `-` sorts
    /// descending and a leading `+` is ignored. Empty keys yield `None`.
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        let (field, direction) = match key.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (key.trim_start_matches('+'), SortDirection::Asc),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self::new(field, direction))
    }
}
