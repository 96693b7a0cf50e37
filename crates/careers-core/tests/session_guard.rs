//! Session guard behaviour against a mock portal API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use careers_core::api::{ApiError, ClientFactory, HttpClient};
use careers_core::auth::{MemorySessionStore, SessionExpiredHandler, SessionStore, LOGIN_PATH};
use careers_core::config::ClientConfig;
use careers_core::models::{Ack, ApiResponse};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Default)]
struct RecordingRedirect {
    count: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

impl RecordingRedirect {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl SessionExpiredHandler for RecordingRedirect {
    fn session_expired(&self, login_path: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(login_path.to_string());
    }
}

struct Harness {
    server: MockServer,
    store: Arc<MemorySessionStore>,
    redirect: Arc<RecordingRedirect>,
    factory: ClientFactory,
}

impl Harness {
    async fn new(token: Option<&str>) -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(match token {
            Some(t) => MemorySessionStore::with_token(t),
            None => MemorySessionStore::new(),
        });
        let redirect = Arc::new(RecordingRedirect::default());
        let factory = ClientFactory::new(
            ClientConfig::new(server.uri()),
            store.clone(),
            redirect.clone(),
        );
        Self {
            server,
            store,
            redirect,
            factory,
        }
    }

    fn auth_api(&self) -> HttpClient {
        self.factory.authenticated().unwrap()
    }

    fn api(&self) -> HttpClient {
        self.factory.anonymous().unwrap()
    }

    async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

fn authorization(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .map(|v| v.to_str().unwrap().to_string())
}

async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

// =============================================================================
// Request phase
// =============================================================================

#[tokio::test]
async fn test_authenticated_client_sends_bearer_token() {
    let h = Harness::new(Some("jwt-abc")).await;
    mount(
        &h.server,
        "GET",
        "/api/applications",
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
    )
    .await;

    let resp: ApiResponse<Vec<Value>> = h.auth_api().get("/api/applications").await.unwrap();
    assert!(resp.data.is_empty());

    let requests = h.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(authorization(&requests[0]).as_deref(), Some("Bearer jwt-abc"));
}

#[tokio::test]
async fn test_anonymous_client_never_sends_token() {
    // Scenario: public listing with filters while a credential is stored
    let h = Harness::new(Some("jwt-abc")).await;
    mount(
        &h.server,
        "GET",
        "/api/jobs/public",
        ResponseTemplate::new(200).set_body_json(json!({"data": []})),
    )
    .await;

    let filters = json!({"type": "Full-time", "category": "Engineering", "search": "rust"});
    let _: ApiResponse<Vec<Value>> = h
        .api()
        .get_with_query("/api/jobs/public", &filters)
        .await
        .unwrap();

    // And again with the credential gone
    h.store.clear().unwrap();
    let _: ApiResponse<Vec<Value>> = h.api().get("/api/jobs/public").await.unwrap();

    let requests = h.requests().await;
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(authorization(request), None);
    }
    let query: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(query.contains(&("type".to_string(), "Full-time".to_string())));
    assert!(query.contains(&("search".to_string(), "rust".to_string())));
}

#[tokio::test]
async fn test_default_json_headers() {
    let h = Harness::new(None).await;
    mount(
        &h.server,
        "POST",
        "/api/auth/forgot-password",
        ResponseTemplate::new(200),
    )
    .await;

    let ack: Option<Ack> = h
        .api()
        .post("/api/auth/forgot-password", &json!({"email": "a@b.io"}))
        .await
        .unwrap();
    assert!(ack.is_none());

    let requests = h.requests().await;
    let content_type = requests[0].headers.get("content-type").unwrap();
    assert_eq!(content_type.to_str().unwrap(), "application/json");
    assert_eq!(
        requests[0].body_json::<Value>().unwrap(),
        json!({"email": "a@b.io"})
    );
}

// =============================================================================
// Response phase
// =============================================================================

#[tokio::test]
async fn test_401_without_credential_redirects() {
    // Scenario: nothing stored, profile fetch is rejected
    let h = Harness::new(None).await;
    mount(
        &h.server,
        "GET",
        "/api/applicant/profile",
        ResponseTemplate::new(401).set_body_json(json!({"message": "Not authorized"})),
    )
    .await;

    let err = h
        .auth_api()
        .get::<Value>("/api/applicant/profile")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(Some(ref m)) if m == "Not authorized"));
    assert_eq!(h.store.get(), None);
    assert_eq!(h.redirect.count(), 1);
    assert_eq!(*h.redirect.paths.lock().unwrap(), vec![LOGIN_PATH.to_string()]);

    let requests = h.requests().await;
    assert_eq!(authorization(&requests[0]), None);
}

#[tokio::test]
async fn test_multipart_apply_keeps_session() {
    // Scenario: valid credential, resume upload accepted with 201
    let h = Harness::new(Some("jwt-abc")).await;
    mount(
        &h.server,
        "POST",
        "/api/applications/jobs/42/apply",
        ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Application submitted",
            "data": {"_id": "app-1", "status": "Pending"}
        })),
    )
    .await;

    let form = Form::new()
        .text("coverLetter", "Hello")
        .part(
            "resume",
            Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("cv.pdf")
                .mime_str("application/pdf")
                .unwrap(),
        )
        .text("answers", "[]");
    let ack: Ack = h
        .auth_api()
        .post_multipart("/api/applications/jobs/42/apply", form)
        .await
        .unwrap();

    assert_eq!(ack.message.as_deref(), Some("Application submitted"));
    assert_eq!(ack.data.unwrap()["_id"], "app-1");
    assert_eq!(h.store.get().as_deref(), Some("jwt-abc"));
    assert_eq!(h.redirect.count(), 0);

    let requests = h.requests().await;
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert_eq!(authorization(&requests[0]).as_deref(), Some("Bearer jwt-abc"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"resume\"; filename=\"cv.pdf\""));
}

#[tokio::test]
async fn test_expired_token_cleared_and_not_resent() {
    // Scenario: token expires mid-session
    let h = Harness::new(Some("expired")).await;
    mount(
        &h.server,
        "GET",
        "/api/applications",
        ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
    )
    .await;
    mount(
        &h.server,
        "GET",
        "/api/applicant/profile",
        ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "Ann"}})),
    )
    .await;

    let auth_api = h.auth_api();
    let err = auth_api.get::<Value>("/api/applications").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("Token expired"));
    assert_eq!(h.store.get(), None);
    assert_eq!(h.redirect.count(), 1);

    // Next call from another view's client carries no credential
    let other_view = h.auth_api();
    let _: Value = other_view.get("/api/applicant/profile").await.unwrap();

    let requests = h.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(authorization(&requests[0]).as_deref(), Some("Bearer expired"));
    assert_eq!(authorization(&requests[1]), None);
}

#[tokio::test]
async fn test_redirect_fires_once_per_failing_call() {
    let h = Harness::new(Some("expired")).await;
    mount(
        &h.server,
        "GET",
        "/api/applications",
        ResponseTemplate::new(401),
    )
    .await;

    let auth_api = h.auth_api();
    assert!(auth_api.get::<Value>("/api/applications").await.is_err());
    assert!(auth_api.get::<Value>("/api/applications").await.is_err());
    assert_eq!(h.redirect.count(), 2);
}

#[tokio::test]
async fn test_other_error_statuses_leave_session_alone() {
    let h = Harness::new(Some("jwt-abc")).await;
    for status in [400u16, 403, 404, 500] {
        mount(
            &h.server,
            "GET",
            &format!("/api/status/{}", status),
            ResponseTemplate::new(status).set_body_json(json!({"message": format!("failed {}", status)})),
        )
        .await;
    }

    let auth_api = h.auth_api();
    for status in [400u16, 403, 404, 500] {
        let err = auth_api
            .get::<Value>(&format!("/api/status/{}", status))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(status));
        assert_eq!(err.server_message(), Some(format!("failed {}", status).as_str()));
    }

    assert_eq!(h.store.get().as_deref(), Some("jwt-abc"));
    assert_eq!(h.redirect.count(), 0);
    // No retries either
    assert_eq!(h.requests().await.len(), 4);
}

#[tokio::test]
async fn test_401_on_anonymous_client_is_not_intercepted() {
    let h = Harness::new(Some("jwt-abc")).await;
    mount(&h.server, "POST", "/api/auth/login", ResponseTemplate::new(401)).await;

    let err = h
        .api()
        .post::<Value, _>("/api/auth/login", &json!({"email": "a@b.io", "password": "x"}))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(h.store.get().as_deref(), Some("jwt-abc"));
    assert_eq!(h.redirect.count(), 0);
}

#[tokio::test]
async fn test_unauthorized_with_truncated_body_ends_session() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: 200\r\n\r\n{\"message\":")
            .await
            .unwrap();
        // Close before the promised body length arrives
        socket.shutdown().await.unwrap();
    });

    let store = Arc::new(MemorySessionStore::with_token("jwt-abc"));
    let redirect = Arc::new(RecordingRedirect::default());
    let factory = ClientFactory::new(
        ClientConfig::new(format!("http://{}", addr)),
        store.clone(),
        redirect.clone(),
    );

    let err = factory
        .authenticated()
        .unwrap()
        .get::<Value>("/api/applications")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(store.get(), None);
    assert_eq!(redirect.count(), 1);
}

#[tokio::test]
async fn test_transport_failure_passes_through() {
    let store = Arc::new(MemorySessionStore::with_token("jwt-abc"));
    let redirect = Arc::new(RecordingRedirect::default());
    // Port 9 (discard) on localhost is not expected to be listening
    let factory = ClientFactory::new(
        ClientConfig::new("http://127.0.0.1:9"),
        store.clone(),
        redirect.clone(),
    );

    let err = factory
        .authenticated()
        .unwrap()
        .get::<Value>("/api/applications")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(store.get().as_deref(), Some("jwt-abc"));
    assert_eq!(redirect.count(), 0);
}

#[tokio::test]
async fn test_invalid_json_is_reported() {
    let h = Harness::new(None).await;
    mount(
        &h.server,
        "GET",
        "/api/jobs/public",
        ResponseTemplate::new(200).set_body_string("<html>oops</html>"),
    )
    .await;

    let err = h.api().get::<Value>("/api/jobs/public").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

// =============================================================================
// Concurrency and factory
// =============================================================================

#[tokio::test]
async fn test_concurrent_requests_with_one_rejection() {
    let h = Harness::new(Some("jwt-abc")).await;
    mount(
        &h.server,
        "GET",
        "/api/applications",
        ResponseTemplate::new(401),
    )
    .await;
    mount(
        &h.server,
        "GET",
        "/api/applicant/profile",
        ResponseTemplate::new(200).set_body_json(json!({"data": {}})),
    )
    .await;

    let auth_api = h.auth_api();
    let (rejected, accepted) = futures::join!(
        auth_api.get::<Value>("/api/applications"),
        auth_api.get::<Value>("/api/applicant/profile"),
    );

    assert!(rejected.unwrap_err().is_unauthorized());
    assert!(accepted.is_ok());
    assert_eq!(h.store.get(), None);
    assert_eq!(h.redirect.count(), 1);
}

#[tokio::test]
async fn test_factory_clients_are_equivalent() {
    let h = Harness::new(Some("jwt-abc")).await;
    mount(
        &h.server,
        "DELETE",
        "/api/applications/app-1",
        ResponseTemplate::new(204),
    )
    .await;

    let first = h.factory.create(true).unwrap();
    let second = h.factory.create(true).unwrap();
    assert_eq!(first.base_url(), second.base_url());

    let a: Option<Value> = first.delete("/api/applications/app-1").await.unwrap();
    let b: Option<Value> = second.delete("/api/applications/app-1").await.unwrap();
    assert!(a.is_none() && b.is_none());

    let requests = h.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(authorization(&requests[0]), authorization(&requests[1]));
}
