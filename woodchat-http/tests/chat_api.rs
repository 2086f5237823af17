use serde_json::json;
use woodchat_common::{AskBackend, BackendError};
use woodchat_http::{ChatApi, HttpClient, HttpError, RequestOpts};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[tokio::test]
async fn ask_posts_the_question_and_decodes_the_answer() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .and(body_json(json!({"question": "What is MDF?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Medium Density Fiberboard",
            "confidence": 0.92
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ChatApi::new(&server.uri()).unwrap();
    let resp = api.ask("What is MDF?").await.unwrap();
    assert_eq!(resp.answer, "Medium Density Fiberboard");
    assert!((resp.confidence - 0.92).abs() < 1e-9);
}

#[tokio::test]
async fn error_bodies_become_service_errors() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "No question provided"})),
        )
        .mount(&server)
        .await;

    let api = ChatApi::new(&server.uri()).unwrap();
    match api.ask("").await {
        Err(HttpError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "No question provided");
        }
        other => panic!("expected api error, got {other:?}"),
    }

    let err = AskBackend::ask(&api, "").await.unwrap_err();
    assert_eq!(err, BackendError::Service("No question provided".into()));
}

#[tokio::test]
async fn server_errors_are_not_retried_by_default() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "An error occurred while processing your question",
            "details": "database is locked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ChatApi::new(&server.uri()).unwrap();
    let err = AskBackend::ask(&api, "hello").await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Service("An error occurred while processing your question".into())
    );
}

#[tokio::test]
async fn retries_are_opt_in() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap().with_retries(2);
    let err = client
        .get_json::<serde_json::Value>("healthz", RequestOpts::default())
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
}

#[tokio::test]
async fn unreadable_replies_are_unavailable() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let api = ChatApi::new(&server.uri()).unwrap();
    let err = AskBackend::ask(&api, "hello").await.unwrap_err();
    assert!(matches!(err, BackendError::Unavailable(_)));
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    // Nothing listens on port 9 of the loopback interface.
    let api = ChatApi::new("http://127.0.0.1:9").unwrap();
    let err = AskBackend::ask(&api, "hello").await.unwrap_err();
    assert!(matches!(err, BackendError::Unavailable(_)));
}

#[tokio::test]
async fn reload_reports_success_and_failure() {
    if !can_bind_localhost() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/reload_data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Reloaded 3 FAQ entries"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/reload_data"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Failed to reload data",
            "details": "disk full"
        })))
        .mount(&server)
        .await;

    let api = ChatApi::new(&server.uri()).unwrap();
    let ok = api.reload().await.unwrap();
    assert!(ok.success);
    assert_eq!(ok.message.as_deref(), Some("Reloaded 3 FAQ entries"));

    let err = api.reload().await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert!(err.to_string().contains("Failed to reload data"));
}
