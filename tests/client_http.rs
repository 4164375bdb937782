//! End-to-end client tests against a mock Knack server
//!
//! Covers the wire contract: credential headers, endpoint paths, fixed
//! query parameters, strict 200-only success gating, and the
//! directory-population and relabeling behavior layered on top.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use knack_client::{FilterGroup, Filters, KnackClient, KnackConfig, KnackError, ListOptions};

fn client_for(server: &MockServer) -> KnackClient {
    KnackClient::with_config(KnackConfig {
        base_url: server.uri(),
        app_id: "app-123".to_string(),
        api_key: "key-456".to_string(),
        ..Default::default()
    })
}

fn objects_body() -> serde_json::Value {
    json!({
        "objects": [
            {"name": "Dogs", "key": "object_1"},
            {"name": "Vets", "key": "object_2"},
        ]
    })
}

async fn mount_dog_fields(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/objects/object_1/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [
                {"key": "field_5", "label": "Name"},
                {"key": "field_6", "label": "Breed"},
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_objects_sends_credentials_and_populates_the_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects"))
        .and(header("x-knack-application-id", "app-123"))
        .and(header("x-knack-rest-api-key", "key-456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(objects_body()))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let payload = client.fetch_objects().await.unwrap();

    assert_eq!(payload.objects.len(), 2);
    assert_eq!(client.objects()["Dogs"], "object_1");
    assert_eq!(client.resolve_object("Vets").unwrap(), "object_2");
}

#[tokio::test]
async fn fetch_objects_twice_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(objects_body()))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.fetch_objects().await.unwrap();
    let after_one = client.objects().clone();
    client.fetch_objects().await.unwrap();

    assert_eq!(client.objects(), &after_one);
}

#[tokio::test]
async fn server_errors_leave_the_directory_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.fetch_objects().await.unwrap_err();

    assert!(matches!(err, KnackError::Server { status: 500, .. }));
    assert!(client.objects().is_empty());
}

#[tokio::test]
async fn non_200_success_codes_count_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(201).set_body_json(objects_body()))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.fetch_objects().await.unwrap_err();

    assert_eq!(err.status(), Some(201));
    assert!(client.objects().is_empty());
}

#[tokio::test]
async fn unparseable_bodies_are_data_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.fetch_objects().await.unwrap_err();

    assert!(matches!(err, KnackError::Json(_)));
    assert!(client.objects().is_empty());
}

#[tokio::test]
async fn a_body_missing_the_objects_array_is_a_data_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": []})))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    assert!(matches!(
        client.fetch_objects().await,
        Err(KnackError::Json(_))
    ));
}

#[tokio::test]
async fn fetch_fields_builds_both_lookup_directions() {
    let server = MockServer::start().await;
    mount_dog_fields(&server).await;

    let mut client = client_for(&server);
    let payload = client.fetch_fields("object_1").await.unwrap();

    assert_eq!(payload.fields.len(), 2);
    assert_eq!(client.resolve_field("Name", "object_1").unwrap(), "field_5");
    let directory = client.fields("object_1").unwrap();
    assert_eq!(directory.label_for("field_6"), Some("Breed"));
    assert_eq!(directory.label_for("id"), Some("id"));
}

#[tokio::test]
async fn a_second_field_fetch_replaces_the_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects/object_1/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [{"key": "field_5", "label": "Name"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.fetch_fields("object_1").await.unwrap();
    server.reset().await;

    Mock::given(method("GET"))
        .and(path("/objects/object_1/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [{"key": "field_9", "label": "Chip Number"}]
        })))
        .mount(&server)
        .await;
    client.fetch_fields("object_1").await.unwrap();

    let directory = client.fields("object_1").unwrap();
    assert_eq!(directory.key_for("Chip Number"), Some("field_9"));
    assert_eq!(directory.key_for("Name"), None);
}

#[tokio::test]
async fn list_records_sends_the_fixed_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects/object_1/records"))
        .and(query_param("format", "raw"))
        .and(query_param("sort_field", "id"))
        .and(query_param("sort_order", "asc"))
        .and(query_param("rows_per_page", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "x1"}],
            "total_pages": 1,
            "current_page": 1,
            "total_records": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .list_records("object_1", ListOptions::new())
        .await
        .unwrap();

    assert_eq!(page.records.len(), 1);
    assert_eq!(page.total_records, Some(1));
}

#[tokio::test]
async fn list_records_serializes_structured_filters() {
    let filters: Filters = FilterGroup::all().rule("field_5", "is", "Rex").into();
    let expected = filters.to_query_value().unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects/object_1/records"))
        .and(query_param("filters", expected.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .list_records("object_1", ListOptions::new().filters(filters))
        .await
        .unwrap();
}

#[tokio::test]
async fn list_records_relabels_against_the_field_directory() {
    let server = MockServer::start().await;
    mount_dog_fields(&server).await;
    Mock::given(method("GET"))
        .and(path("/objects/object_1/records"))
        .and(query_param("sort_field", "field_5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"field_5": "Rex", "field_99": "unmapped", "id": "x1"},
                {"field_6": "Husky", "id": "x2"},
            ]
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.fetch_fields("object_1").await.unwrap();
    let page = client
        .list_records(
            "object_1",
            ListOptions::new().sort_field("Name").relabel(true),
        )
        .await
        .unwrap();

    assert_eq!(
        page.records[0],
        json!({"Name": "Rex", "field_99": "unmapped", "id": "x1"})
    );
    assert_eq!(page.records[1], json!({"Breed": "Husky", "id": "x2"}));
}

#[tokio::test]
async fn unresolved_names_fail_before_any_request() {
    let server = MockServer::start().await;

    let client = client_for(&server);
    let err = client
        .list_records("Dogs", ListOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, KnackError::UnknownObject(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_record_addresses_the_record_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects/object_1/records/x1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"field_5": "Rex", "id": "x1"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client.get_record("x1", "object_1", false).await.unwrap();
    assert_eq!(record["field_5"], "Rex");
}

#[tokio::test]
async fn create_record_posts_the_payload() {
    let data = json!({"field_5": "Fido"});

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/objects/object_1/records"))
        .and(body_json(&data))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"field_5": "Fido", "id": "x9"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client.create_record(&data, "object_1", false).await.unwrap();
    assert_eq!(record["id"], "x9");
}

#[tokio::test]
async fn update_record_puts_json_with_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/objects/object_1/records/x1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"field_5": "Max"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"field_5": "Max", "id": "x1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client
        .update_record("x1", json!({"field_5": "Max"}), "object_1", false)
        .await
        .unwrap();
    assert_eq!(record["field_5"], "Max");
}

#[tokio::test]
async fn update_record_accepts_a_preserialized_string() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/objects/object_1/records/x1"))
        .and(body_json(json!({"field_5": "Max"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x1"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .update_record("x1", r#"{"field_5":"Max"}"#, "object_1", false)
        .await
        .unwrap();
}

#[tokio::test]
async fn update_record_rejects_scalar_payloads_locally() {
    let server = MockServer::start().await;

    let client = client_for(&server);
    let err = client
        .update_record("x1", json!(42), "object_1", false)
        .await
        .unwrap_err();

    assert!(matches!(err, KnackError::Payload(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_record_returns_the_confirmation_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/objects/object_1/records/x1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"delete": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let confirmation = client.delete_record("x1", "object_1").await.unwrap();
    assert_eq!(confirmation, json!({"delete": true}));
}

#[tokio::test]
async fn record_ids_are_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects/object_1/records/a%20b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a b"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client.get_record("a b", "object_1", false).await.unwrap();
    assert_eq!(record["id"], "a b");
}
