//! Record filters for the `filters` query parameter
//!
//! Knack accepts a JSON filter document of the shape
//! `{"match": "and" | "or", "rules": [{"field", "operator", "value"}]}`.
//! [`FilterGroup`] builds that document with types; [`Filters`] also
//! accepts an arbitrary JSON value or a pre-serialized string for callers
//! that construct the document themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// How a group combines its rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMatch {
    And,
    Or,
}

/// One filter rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    /// Field key the rule applies to
    pub field: String,
    /// Knack operator name, e.g. `is`, `contains`, `higher than`
    pub operator: String,
    /// Comparison value
    pub value: Value,
}

impl FilterRule {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// A group of filter rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(rename = "match")]
    pub match_type: FilterMatch,
    pub rules: Vec<FilterRule>,
}

impl FilterGroup {
    /// Group matching all rules.
    pub fn all() -> Self {
        Self {
            match_type: FilterMatch::And,
            rules: Vec::new(),
        }
    }

    /// Group matching any rule.
    pub fn any() -> Self {
        Self {
            match_type: FilterMatch::Or,
            rules: Vec::new(),
        }
    }

    /// Append a rule.
    pub fn rule(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.rules.push(FilterRule::new(field, operator, value));
        self
    }
}

/// Filters accepted by record listings
#[derive(Debug, Clone)]
pub enum Filters {
    /// Typed filter group, serialized by the client
    Group(FilterGroup),
    /// Arbitrary filter document, serialized by the client
    Json(Value),
    /// Pre-serialized filter string, sent verbatim
    Raw(String),
}

impl Filters {
    /// Serialized form for the `filters` query parameter.
    pub fn to_query_value(&self) -> Result<String> {
        match self {
            Filters::Group(group) => Ok(serde_json::to_string(group)?),
            Filters::Json(value) => Ok(serde_json::to_string(value)?),
            Filters::Raw(s) => Ok(s.clone()),
        }
    }
}

impl From<FilterGroup> for Filters {
    fn from(group: FilterGroup) -> Self {
        Filters::Group(group)
    }
}

impl From<Value> for Filters {
    fn from(value: Value) -> Self {
        Filters::Json(value)
    }
}

impl From<&str> for Filters {
    fn from(s: &str) -> Self {
        Filters::Raw(s.to_string())
    }
}

impl From<String> for Filters {
    fn from(s: String) -> Self {
        Filters::Raw(s)
    }
}
