//! Types for the Knack client API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::Filters;

/// Default production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.knack.com/v1";

/// Client configuration
#[derive(Debug, Clone)]
pub struct KnackConfig {
    /// Base URL for the Knack HTTP API
    pub base_url: String,
    /// Application ID, sent as `X-Knack-Application-Id`
    pub app_id: String,
    /// API key, sent as `X-Knack-REST-API-KEY`
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for KnackConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: String::new(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// True if `s` is `<prefix>` followed by one or more ASCII digits.
fn is_canonical(s: &str, prefix: &str) -> bool {
    s.strip_prefix(prefix)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// How a caller names a Knack object.
///
/// The dynamic original dispatched on the runtime type of the identifier;
/// here the three accepted shapes are explicit variants, and the `From`
/// impls classify strings so call sites can pass `"Dogs"` or `"object_3"`
/// interchangeably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectRef {
    /// Canonical key, `object_<n>` — used as-is
    Key(String),
    /// Human-readable name, resolved through the object directory
    Name(String),
    /// Numeric id, synthesized into `object_<n>`
    Id(u64),
}

impl From<&str> for ObjectRef {
    fn from(s: &str) -> Self {
        if is_canonical(s, "object_") {
            ObjectRef::Key(s.to_string())
        } else {
            ObjectRef::Name(s.to_string())
        }
    }
}

impl From<String> for ObjectRef {
    fn from(s: String) -> Self {
        ObjectRef::from(s.as_str())
    }
}

impl From<u64> for ObjectRef {
    fn from(n: u64) -> Self {
        ObjectRef::Id(n)
    }
}

/// How a caller names a Knack field.
///
/// The literal `"id"` counts as a key: every record carries it and the
/// server accepts it anywhere a `field_<n>` key is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// Canonical key, `field_<n>` or the literal `id` — used as-is
    Key(String),
    /// Human-readable label, resolved through the field directory
    Label(String),
    /// Numeric id, synthesized into `field_<n>`
    Id(u64),
}

impl From<&str> for FieldRef {
    fn from(s: &str) -> Self {
        if s == "id" || is_canonical(s, "field_") {
            FieldRef::Key(s.to_string())
        } else {
            FieldRef::Label(s.to_string())
        }
    }
}

impl From<String> for FieldRef {
    fn from(s: String) -> Self {
        FieldRef::from(s.as_str())
    }
}

impl From<u64> for FieldRef {
    fn from(n: u64) -> Self {
        FieldRef::Id(n)
    }
}

/// One entry of the objects listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Human-readable object name
    pub name: String,
    /// Canonical object key
    pub key: String,
}

/// Response from the objects listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectsResponse {
    /// All objects in the application
    pub objects: Vec<ObjectInfo>,
}

/// One entry of an object's fields listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Canonical field key
    pub key: String,
    /// Human-readable field label
    pub label: String,
}

/// Response from the fields listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldsResponse {
    /// All fields of the object
    pub fields: Vec<FieldInfo>,
}

/// One page of records, with the pagination metadata Knack returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
    /// Records on this page; shape is object-specific and left opaque
    pub records: Vec<Value>,
    /// Total number of pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    /// Page number of this response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    /// Total records across all pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
}

/// Options for [`KnackClient::list_records`](crate::KnackClient::list_records)
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Field to sort by (default: the `id` key)
    pub sort_field: FieldRef,
    /// Optional record filters
    pub filters: Option<Filters>,
    /// Rewrite record keys to field labels (default: false)
    pub relabel: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            sort_field: FieldRef::Key("id".to_string()),
            filters: None,
            relabel: false,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by the given field (key, label, or numeric id).
    pub fn sort_field(mut self, field: impl Into<FieldRef>) -> Self {
        self.sort_field = field.into();
        self
    }

    /// Filter records with the given filters.
    pub fn filters(mut self, filters: impl Into<Filters>) -> Self {
        self.filters = Some(filters.into());
        self
    }

    /// Rewrite record keys to field labels in the response.
    pub fn relabel(mut self, relabel: bool) -> Self {
        self.relabel = relabel;
        self
    }
}

/// Body of a record update
#[derive(Debug, Clone)]
pub enum RecordData {
    /// A JSON value, serialized by the client; must be an object or array
    Structured(Value),
    /// An already-serialized JSON string, sent verbatim
    Raw(String),
}

impl From<Value> for RecordData {
    fn from(v: Value) -> Self {
        RecordData::Structured(v)
    }
}

impl From<&str> for RecordData {
    fn from(s: &str) -> Self {
        RecordData::Raw(s.to_string())
    }
}

impl From<String> for RecordData {
    fn from(s: String) -> Self {
        RecordData::Raw(s)
    }
}
