//! HTTP gateway against a mock API: envelopes, route shapes, payload
//! encodings and error mapping.

use campus_client::{ApiClient, ClientConfig, HttpGateway};
use campus_core::entity::{BLOG, CONSULTATION, SUBSCRIBER, UNIVERSITY};
use campus_core::{Error, LocalFile, MediaRef, Payload, Record, RecordId, RemoteGateway};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer, descriptor: &'static campus_core::EntityDescriptor) -> HttpGateway {
    let config = ClientConfig::new(format!("{}/api", server.uri())).with_session_cookie("secret");
    HttpGateway::new(ApiClient::new(config).unwrap(), descriptor)
}

fn rec(value: serde_json::Value) -> Record {
    Record::from_value(value).unwrap()
}

#[tokio::test]
async fn test_get_all_unwraps_double_envelope_and_aliases_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/universities"))
        .and(header("cookie", "token=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"data": [
                {"_id": "u1", "name": "Sapienza"},
                {"_id": "u2", "name": "Pavia"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = gateway(&server, &UNIVERSITY).get_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id(), Some(RecordId::from("u1")));
    assert!(!records[0].contains_key("_id"));
}

#[tokio::test]
async fn test_get_all_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "title": "Hi"}])))
        .mount(&server)
        .await;

    let records = gateway(&server, &BLOG).get_all().await.unwrap();
    assert_eq!(records[0].id().unwrap().as_str(), "7");
}

#[tokio::test]
async fn test_create_sends_json_without_pending_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/universities/create"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Test U", "location": "Rome"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"_id": "u9", "name": "Test U", "location": "Rome"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let existing_logo = MediaRef::Remote(campus_core::RemoteMedia::new("https://cdn/logo.png"));
    let payload = Payload::build(
        &rec(json!({"name": "Test U", "location": "Rome", "admission": null})),
        [("logo", Some(&existing_logo)), ("campusImage", None)],
    )
    .drop_nulls();
    let created = gateway(&server, &UNIVERSITY).create(&payload).await.unwrap();
    assert_eq!(created.unwrap().id(), Some(RecordId::from("u9")));
}

#[tokio::test]
async fn test_create_without_echo_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/subscribers/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Subscribed"})))
        .mount(&server)
        .await;

    let payload = Payload::from_fields(&rec(json!({"email": "ada@example.com"})));
    let created = gateway(&server, &SUBSCRIBER).create(&payload).await.unwrap();
    assert!(created.is_none());
}

#[tokio::test]
async fn test_update_with_file_sends_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/universities/update/u1"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let logo = MediaRef::Pending(LocalFile::new("logo.png", b"\x89PNG\r\n\x1a\nrest".to_vec(), "image/png"));
    let payload = Payload::build(
        &rec(json!({"name": "Sapienza", "courses": ["Medicine", "Dentistry"]})),
        [("logo", Some(&logo)), ("campusImage", None)],
    );
    let updated = gateway(&server, &UNIVERSITY)
        .update(&RecordId::from("u1"), &payload)
        .await
        .unwrap();
    assert!(updated.is_none());

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"logo\"; filename=\"logo.png\""));
    assert!(!body.contains("name=\"campusImage\""));
    assert_eq!(body.matches("name=\"courses\"").count(), 2);
}

#[tokio::test]
async fn test_edit_and_bare_delete_routes() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/blogs/edit/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"_id": "b1", "title": "New"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/blogs/b1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let blogs = gateway(&server, &BLOG);
    let id = RecordId::from("b1");
    let updated = blogs
        .update(&id, &Payload::from_fields(&rec(json!({"title": "New"}))))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.get_str("title"), Some("New"));
    blogs.delete(&id).await.unwrap();
}

#[tokio::test]
async fn test_delete_route_with_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/universities/delete/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server, &UNIVERSITY)
        .delete(&RecordId::from("u1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_consultation_mark_completed_action() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/consultations/complete/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let consultations = gateway(&server, &CONSULTATION);
    let result = consultations
        .action("mark_completed", &RecordId::from("c1"))
        .await
        .unwrap();
    assert!(result.is_none());

    let err = consultations
        .update(&RecordId::from("c1"), &Payload::from_fields(&Record::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[tokio::test]
async fn test_api_error_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/universities/create"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Name already exists"})))
        .mount(&server)
        .await;

    let err = gateway(&server, &UNIVERSITY)
        .create(&Payload::from_fields(&rec(json!({"name": "Dup"}))))
        .await
        .unwrap_err();
    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Name already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Name already exists");
}

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/universities"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = gateway(&server, &UNIVERSITY).get_all().await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

#[tokio::test]
async fn test_transport_failure_is_request_error() {
    let config = ClientConfig::new("http://127.0.0.1:9/api").with_timeout_secs(2);
    let gateway = HttpGateway::new(ApiClient::new(config).unwrap(), &UNIVERSITY);
    let err = gateway.get_all().await.unwrap_err();
    assert!(matches!(err, Error::Request(_)));
}
