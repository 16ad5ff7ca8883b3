//! Session verification and public helpers against a mock API.

use campus_client::public::{fetch_catalog, subscribe_newsletter};
use campus_client::{ApiClient, AuthDecision, AuthGate, ClientConfig, SessionClient};
use campus_core::{Course, Error, SessionVerifier, Subscriber};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer, cookie: Option<&str>) -> ApiClient {
    let mut config = ClientConfig::new(format!("{}/api", server.uri()));
    if let Some(cookie) = cookie {
        config = config.with_session_cookie(cookie);
    }
    ApiClient::new(config).unwrap()
}

#[tokio::test]
async fn test_valid_session_is_allowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .and(header("cookie", "token=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"isValid": true})))
        .expect(1)
        .mount(&server)
        .await;

    let gate = AuthGate::new(SessionClient::new(api(&server, Some("abc"))), "/admin/login");
    assert_eq!(gate.check().await, AuthDecision::Allowed);
}

#[tokio::test]
async fn test_rejected_session_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})))
        .mount(&server)
        .await;

    let verifier = SessionClient::new(api(&server, Some("stale")));
    assert!(!verifier.verify_session().await.unwrap());

    let gate = AuthGate::new(verifier, "/admin/login");
    assert_eq!(gate.check().await, AuthDecision::Redirect("/admin/login".to_string()));
}

#[tokio::test]
async fn test_server_error_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gate = AuthGate::new(SessionClient::new(api(&server, Some("abc"))), "/login");
    assert_eq!(gate.check().await, AuthDecision::Redirect("/login".to_string()));
}

#[tokio::test]
async fn test_missing_cookie_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .expect(0)
        .mount(&server)
        .await;

    let verifier = SessionClient::new(api(&server, None));
    assert!(!verifier.verify_session().await.unwrap());
}

#[tokio::test]
async fn test_subscribe_newsletter_posts_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/subscribers/create"))
        .and(body_json(json!({"email": "ada@example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "Subscribed"})))
        .expect(1)
        .mount(&server)
        .await;

    subscribe_newsletter(&api(&server, None), "  ada@example.com ")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_subscribe_rejects_bad_email_locally() {
    let server = MockServer::start().await;
    let err = subscribe_newsletter(&api(&server, None), "not-an-email")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_catalog_decodes_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"_id": "c1", "title": "IMAT Prep", "category": "Medicine"}]
        })))
        .mount(&server)
        .await;

    let courses: Vec<Course> = fetch_catalog(&api(&server, None)).await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].title, "IMAT Prep");
}

#[tokio::test]
async fn test_fetch_catalog_refuses_private_entities() {
    let server = MockServer::start().await;
    let err = fetch_catalog::<Subscriber>(&api(&server, None)).await.unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}
