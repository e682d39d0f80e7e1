//! Query and update operators understood by filters and update documents.

use serde::{Deserialize, Serialize};

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Exact equality.
    #[serde(rename = "$eq")]
    Eq,
    /// Not equal.
    #[serde(rename = "$ne")]
    Ne,
    /// Greater than.
    #[serde(rename = "$gt")]
    Gt,
    /// Greater than or equal.
    #[serde(rename = "$gte")]
    Gte,
    /// Less than.
    #[serde(rename = "$lt")]
    Lt,
    /// Less than or equal.
    #[serde(rename = "$lte")]
    Lte,
    /// Membership in a list.
    #[serde(rename = "$in")]
    In,
    /// Non-membership in a list.
    #[serde(rename = "$nin")]
    Nin,
    /// Field presence check.
    #[serde(rename = "$exists")]
    Exists,
}

impl FilterOp {
    /// Return the operator keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Exists => "$exists",
        }
    }

    /// Parse an operator keyword.
    pub fn parse(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "$eq" => Self::Eq,
            "$ne" => Self::Ne,
            "$gt" => Self::Gt,
            "$gte" => Self::Gte,
            "$lt" => Self::Lt,
            "$lte" => Self::Lte,
            "$in" => Self::In,
            "$nin" => Self::Nin,
            "$exists" => Self::Exists,
            _ => return None,
        })
    }
}

/// Update document operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    /// Assign fields.
    #[serde(rename = "$set")]
    Set,
    /// Remove fields.
    #[serde(rename = "$unset")]
    Unset,
    /// Increment numeric fields.
    #[serde(rename = "$inc")]
    Inc,
}

impl UpdateOp {
    /// Return the operator keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "$set",
            Self::Unset => "$unset",
            Self::Inc => "$inc",
        }
    }

    /// Parse an operator keyword.
    pub fn parse(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "$set" => Self::Set,
            "$unset" => Self::Unset,
            "$inc" => Self::Inc,
            _ => return None,
        })
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
