//! HttpSubmissionClient against a mock registration backend
//!
//! The client is blocking, so the mock server runs on its own tokio
//! runtime and requests are issued from the test thread.

use onboard::client::{HttpSubmissionClient, SubmissionClient};
use onboard::core::{Portal, Session};
use onboard::wizard::{PayloadPart, SubmissionPayload};
use tokio::runtime::Runtime;
use ulid::Ulid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

fn user_payload() -> SubmissionPayload {
    SubmissionPayload {
        portal: Portal::User,
        draft_id: Ulid::new(),
        parts: vec![
            PayloadPart::Text {
                name: "email".into(),
                value: "omar@example.com".into(),
            },
            PayloadPart::Text {
                name: "password".into(),
                value: "hunter22x".into(),
            },
        ],
    }
}

fn client_for(server: &MockServer, token: Option<&str>) -> HttpSubmissionClient {
    let mut session = Session::new(Portal::User, format!("{}/api", server.uri()));
    if let Some(token) = token {
        session = session.with_token(token);
    }
    HttpSubmissionClient::new(session, "/auth/register").unwrap()
}

#[test]
fn test_success_returns_receipt_with_backend_message() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(
                ResponseTemplate::new(201).set_body_string(r#"{"message": "Verification code sent"}"#),
            )
            .mount(&server),
    );

    let mut client = client_for(&server, None);
    let receipt = client.submit(&user_payload()).unwrap();
    assert_eq!(receipt.status, Some(201));
    assert_eq!(receipt.message.as_deref(), Some("Verification code sent"));

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"), "{}", content_type);

    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="email""#));
    assert!(body.contains("omar@example.com"));
    assert!(body.contains(r#"name="password""#));
    assert!(requests[0].headers.get("authorization").is_none());
}

#[test]
fn test_conflict_surfaces_backend_message() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(
                ResponseTemplate::new(409).set_body_string(r#"{"message": "Email already registered"}"#),
            )
            .mount(&server),
    );

    let mut client = client_for(&server, None);
    let err = client.submit(&user_payload()).unwrap_err();
    assert_eq!(err.message, "Email already registered");
}

#[test]
fn test_server_error_without_json_reports_status() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server),
    );

    let mut client = client_for(&server, None);
    let err = client.submit(&user_payload()).unwrap_err();
    assert_eq!(err.message, "HTTP 502");
}

#[test]
fn test_token_is_sent_as_bearer() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server),
    );

    let mut client = client_for(&server, Some("tok-123"));
    let receipt = client.submit(&user_payload()).unwrap();
    assert_eq!(receipt.status, Some(200));
    assert_eq!(receipt.message, None);
}
