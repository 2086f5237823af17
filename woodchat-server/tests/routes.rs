use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use tower::ServiceExt;
use woodchat_actors::actor::{spawn_actor, ActorHandle};
use woodchat_actors::faq::FaqActor;
use woodchat_actors::store::{self, init_schema, StoreActor};
use woodchat_actors::StoreMsg;
use woodchat_common::CONTACT_FALLBACK_ANSWER;
use woodchat_server::{router, AppState};

async fn app(data_dir: &Path) -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();

    let ActorHandle { addr: store, .. } = spawn_actor(StoreActor::new(pool), 64);
    store::request(&store, |reply| StoreMsg::SeedIfEmpty {
        faqs: woodchat_faq::default_faqs(),
        reply,
    })
    .await
    .unwrap();
    let ActorHandle { addr: faq, .. } = spawn_actor(FaqActor::new(store, data_dir), 16);
    router(AppState::new(faq))
}

fn ask_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn ask_answers_known_questions() {
    let dir = tempfile::tempdir().unwrap();
    let resp = app(dir.path())
        .await
        .oneshot(ask_request(r#"{"question":"What is Action TESA HDHMR?"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert!(body["answer"]
        .as_str()
        .unwrap()
        .starts_with("Action TESA HDHMR is a registered trademark"));
    assert!(body["confidence"].as_f64().unwrap() > 0.9);
}

#[tokio::test]
async fn ask_falls_back_to_contact_details() {
    let dir = tempfile::tempdir().unwrap();
    let resp = app(dir.path())
        .await
        .oneshot(ask_request(r#"{"question":"How do I clean my sofa?"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["answer"], CONTACT_FALLBACK_ANSWER);
}

#[tokio::test]
async fn missing_questions_are_bad_requests() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;
    for body in [r#"{"question":""}"#, "{}", "not json"] {
        let resp = app.clone().oneshot(ask_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(
            json_body(resp).await,
            json!({"error": "No question provided"})
        );
    }
}

#[tokio::test]
async fn reload_reads_the_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("BOILO_FAQs.yaml"),
        "- Question: Is BOILO waterproof?\n  Answer: It resists boiling water.\n- Question: Can BOILO be used in kitchens?\n  Answer: Yes.\n",
    )
    .unwrap();
    let app = app(dir.path()).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/reload_data")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        json!({"success": true, "message": "Reloaded 2 FAQ entries"})
    );

    let resp = app
        .oneshot(ask_request(r#"{"question":"is boilo waterproof"}"#))
        .await
        .unwrap();
    assert_eq!(json_body(resp).await["answer"], "It resists boiling water.");
}

#[tokio::test]
async fn healthz_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let resp = app(dir.path())
        .await
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({"status": "ok"}));
}
