//! Rust client for the Knack database REST API
//!
//! Knack stores data as *objects* (collections) holding *records* whose
//! attributes are *fields*. The wire protocol addresses everything by
//! internal keys (`object_12`, `field_5`); this crate keeps small lookup
//! directories so callers can use the human-readable names and labels
//! instead, and can ask for responses relabeled back to those labels.
//!
//! # Example
//!
//! ```rust,no_run
//! use knack_client::{KnackClient, ListOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = KnackClient::new("app-id", "api-key");
//!
//! // Populate the name -> key directories.
//! client.fetch_objects().await?;
//! client.fetch_fields("Dogs").await?;
//!
//! // List records, sorted by a field named by its label, relabeled.
//! let page = client
//!     .list_records("Dogs", ListOptions::new().sort_field("Name").relabel(true))
//!     .await?;
//!
//! for record in &page.records {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod directory;
pub mod error;
pub mod query;
pub mod types;

// Re-export main types
pub use client::KnackClient;
pub use directory::FieldDirectory;
pub use error::{KnackError, Result};
pub use query::{FilterGroup, FilterMatch, FilterRule, Filters};
pub use types::{
    FieldInfo, FieldRef, FieldsResponse, KnackConfig, ListOptions, ObjectInfo, ObjectRef,
    ObjectsResponse, RecordData, RecordPage,
};
