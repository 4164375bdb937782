//! HTTP client for the Knack REST API

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{header, Client, Response};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::directory::FieldDirectory;
use crate::error::{KnackError, Result};
use crate::types::{
    FieldRef, FieldsResponse, KnackConfig, ListOptions, ObjectRef, ObjectsResponse, RecordData,
    RecordPage,
};

/// Client for one Knack application
///
/// Owns the name→key directories for objects and fields. The directories
/// start empty and are populated only by the explicit `fetch_*` calls;
/// record operations never refresh them. Fetches take `&mut self`, so a
/// shared client must be exclusively borrowed while a directory is being
/// replaced.
///
/// # Example
///
/// ```rust,no_run
/// use knack_client::{KnackClient, ListOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = KnackClient::new("app-id", "api-key");
/// client.fetch_objects().await?;
///
/// let page = client.list_records("Dogs", ListOptions::new()).await?;
/// println!("{} records", page.records.len());
/// # Ok(())
/// # }
/// ```
pub struct KnackClient {
    config: KnackConfig,
    client: Client,
    objects: HashMap<String, String>,
    fields: HashMap<String, FieldDirectory>,
}

impl KnackClient {
    /// Create a client for the production endpoint.
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_config(KnackConfig {
            app_id: app_id.into(),
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    /// Create a client with explicit configuration.
    pub fn with_config(config: KnackConfig) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::HeaderName::from_static("x-knack-application-id"),
            header::HeaderValue::from_str(&config.app_id).expect("Invalid application id"),
        );
        headers.insert(
            header::HeaderName::from_static("x-knack-rest-api-key"),
            header::HeaderValue::from_str(&config.api_key).expect("Invalid API key"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            config,
            client,
            objects: HashMap::new(),
            fields: HashMap::new(),
        }
    }

    // ==================== Directories ====================

    /// Fetch the objects listing and merge it into the object directory.
    ///
    /// Existing entries not named by the response are retained. On any
    /// failure the directory is left untouched.
    pub async fn fetch_objects(&mut self) -> Result<ObjectsResponse> {
        let url = format!("{}/objects", self.config.base_url);
        let response = self.client.get(&url).send().await?;
        let payload: ObjectsResponse = self.expect_json(response, "get objects").await?;

        for object in &payload.objects {
            self.objects.insert(object.name.clone(), object.key.clone());
        }
        Ok(payload)
    }

    /// Fetch an object's fields listing and replace its field directory.
    ///
    /// Both lookup directions are rebuilt from the response, plus the
    /// identity entry for `id`. On any failure the prior directory for the
    /// object is left untouched.
    pub async fn fetch_fields(&mut self, object: impl Into<ObjectRef>) -> Result<FieldsResponse> {
        let okey = self.resolve_object(object)?;
        let url = format!("{}/objects/{}/fields", self.config.base_url, okey);
        let response = self.client.get(&url).send().await?;
        let payload: FieldsResponse = self
            .expect_json(response, &format!("get {okey} fields"))
            .await?;

        let mut directory = FieldDirectory::new();
        for field in &payload.fields {
            directory.insert(field.key.as_str(), field.label.as_str());
        }
        self.fields.insert(okey, directory);
        Ok(payload)
    }

    /// Object name→key directory, as populated by [`fetch_objects`](Self::fetch_objects).
    pub fn objects(&self) -> &HashMap<String, String> {
        &self.objects
    }

    /// Field directory for an object key, if [`fetch_fields`](Self::fetch_fields)
    /// has populated one.
    pub fn fields(&self, object_key: &str) -> Option<&FieldDirectory> {
        self.fields.get(object_key)
    }

    // ==================== Records ====================

    /// List an object's records.
    ///
    /// Uses Knack's raw format with ascending sort and a fixed page size of
    /// 1000; pagination metadata comes back on the [`RecordPage`].
    pub async fn list_records(
        &self,
        object: impl Into<ObjectRef>,
        options: ListOptions,
    ) -> Result<RecordPage> {
        let okey = self.resolve_object(object)?;
        let sort_field = self.resolve_field(options.sort_field, okey.as_str())?;

        let mut params: Vec<(&str, String)> = vec![
            ("format", "raw".to_string()),
            ("sort_field", sort_field),
            ("sort_order", "asc".to_string()),
            ("rows_per_page", "1000".to_string()),
        ];
        if let Some(filters) = &options.filters {
            let serialized = filters.to_query_value()?;
            debug!("getting {okey} records with filters: {serialized}");
            params.push(("filters", serialized));
        }

        let url = format!("{}/objects/{}/records", self.config.base_url, okey);
        let response = self.client.get(&url).query(&params).send().await?;
        let mut page: RecordPage = self
            .expect_json(response, &format!("get {okey} records"))
            .await?;

        if options.relabel {
            if let Some(directory) = self.fields.get(&okey) {
                for record in &mut page.records {
                    directory.relabel_record(record);
                }
            }
        }
        Ok(page)
    }

    /// Get a single record by id.
    pub async fn get_record(
        &self,
        id: &str,
        object: impl Into<ObjectRef>,
        relabel: bool,
    ) -> Result<Value> {
        let okey = self.resolve_object(object)?;
        let url = self.record_url(&okey, id);
        info!("getting {okey} record {id}");

        let response = self.client.get(&url).send().await?;
        let mut record: Value = self
            .expect_json(response, &format!("get {okey} record {id}"))
            .await?;
        self.maybe_relabel(&okey, relabel, &mut record);
        Ok(record)
    }

    /// Create a record.
    pub async fn create_record(
        &self,
        data: &Value,
        object: impl Into<ObjectRef>,
        relabel: bool,
    ) -> Result<Value> {
        let okey = self.resolve_object(object)?;
        let url = format!("{}/objects/{}/records", self.config.base_url, okey);
        info!("posting a {okey} record");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(data)
            .send()
            .await?;
        let mut record: Value = self
            .expect_json(response, &format!("post a {okey} record"))
            .await?;
        self.maybe_relabel(&okey, relabel, &mut record);
        Ok(record)
    }

    /// Update a record.
    ///
    /// `data` must be a JSON object or array, or an already-serialized
    /// string; anything else fails with [`KnackError::Payload`] before a
    /// request is made.
    pub async fn update_record(
        &self,
        id: &str,
        data: impl Into<RecordData>,
        object: impl Into<ObjectRef>,
        relabel: bool,
    ) -> Result<Value> {
        let okey = self.resolve_object(object)?;
        let body = match data.into() {
            RecordData::Structured(value) if value.is_object() || value.is_array() => {
                serde_json::to_string(&value)?
            }
            RecordData::Structured(other) => {
                return Err(KnackError::Payload(format!(
                    "expected a JSON object or array, got: {other}"
                )));
            }
            RecordData::Raw(s) => s,
        };

        let url = self.record_url(&okey, id);
        info!("putting {okey} record {id}");

        let response = self
            .client
            .put(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let mut record: Value = self
            .expect_json(response, &format!("put {okey} record {id}"))
            .await?;
        self.maybe_relabel(&okey, relabel, &mut record);
        Ok(record)
    }

    /// Delete a record, returning the server's confirmation body.
    pub async fn delete_record(&self, id: &str, object: impl Into<ObjectRef>) -> Result<Value> {
        let okey = self.resolve_object(object)?;
        let url = self.record_url(&okey, id);
        info!("deleting {okey} record {id}");

        let response = self.client.delete(&url).send().await?;
        self.expect_json(response, &format!("delete {okey} record {id}"))
            .await
    }

    // ==================== Resolution ====================

    /// Resolve an object identifier to its canonical `object_<n>` key.
    ///
    /// Keys pass through unchanged, numeric ids are synthesized, and names
    /// are looked up in the object directory; an unfetched name fails with
    /// [`KnackError::UnknownObject`] rather than producing a request the
    /// server would reject.
    pub fn resolve_object(&self, object: impl Into<ObjectRef>) -> Result<String> {
        match object.into() {
            ObjectRef::Key(key) => Ok(key),
            ObjectRef::Name(name) => self
                .objects
                .get(&name)
                .cloned()
                .ok_or(KnackError::UnknownObject(name)),
            ObjectRef::Id(n) => Ok(format!("object_{n}")),
        }
    }

    /// Resolve a field identifier to its canonical key within an object.
    ///
    /// `id` and `field_<n>` keys pass through, numeric ids are synthesized,
    /// and labels are looked up in the owning object's field directory.
    pub fn resolve_field(
        &self,
        field: impl Into<FieldRef>,
        object: impl Into<ObjectRef>,
    ) -> Result<String> {
        match field.into() {
            FieldRef::Key(key) => Ok(key),
            FieldRef::Label(label) => {
                let okey = self.resolve_object(object)?;
                self.fields
                    .get(&okey)
                    .and_then(|directory| directory.key_for(&label))
                    .map(str::to_string)
                    .ok_or(KnackError::UnknownField(label))
            }
            FieldRef::Id(n) => Ok(format!("field_{n}")),
        }
    }

    // ==================== Helpers ====================

    fn record_url(&self, object_key: &str, id: &str) -> String {
        format!(
            "{}/objects/{}/records/{}",
            self.config.base_url,
            object_key,
            urlencoding::encode(id)
        )
    }

    fn maybe_relabel(&self, object_key: &str, relabel: bool, record: &mut Value) {
        if relabel {
            if let Some(directory) = self.fields.get(object_key) {
                directory.relabel_record(record);
            }
        }
    }

    /// Gate a response on status 200 exactly, then parse its JSON body.
    ///
    /// Knack signals some failures with other 2xx codes, so anything that
    /// is not a plain 200 counts as a server error.
    async fn expect_json<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
        context: &str,
    ) -> Result<T> {
        let status = response.status();
        if status.as_u16() != 200 {
            let message = status.canonical_reason().unwrap_or("unknown status");
            warn!("failed to {context}: {} {message}", status.as_u16());
            return Err(KnackError::Server {
                status: status.as_u16(),
                message: message.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("data error on {context}: {e}");
            KnackError::Json(e)
        })
    }
}
