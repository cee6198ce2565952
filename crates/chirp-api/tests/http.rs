//! Router-level tests: requests go through the real axum router and an
//! in-memory database.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use chirp_api::auth::AppStateInner;
use chirp_api::routes::router;
use chirp_db::Database;

fn app() -> Router {
    app_with_db().0
}

fn app_with_db() -> (Router, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    (router(AppStateInner::new(db.clone())), db)
}

/// Like `send`, but the body and content type go out exactly as given.
async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes)
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/register",
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json_of(&body)["account_id"].as_i64().unwrap()
}

async fn post_message(app: &Router, posted_by: i64, text: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/messages",
        Some(json!({
            "posted_by": posted_by,
            "message_text": text,
            "time_posted_epoch": 1669947792
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json_of(&body)
}

#[tokio::test]
async fn register_and_login_scenario() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        Some(json!({ "username": "bob", "password": "pass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created = json_of(&body);
    let id = created["account_id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(created["username"], "bob");

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        Some(json!({ "username": "bob", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({ "username": "bob", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({ "username": "bob", "password": "pass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body)["account_id"].as_i64(), Some(id));
}

#[tokio::test]
async fn register_rejects_bad_input() {
    let app = app();
    for body in [
        json!({ "username": "", "password": "pass1" }),
        json!({ "username": "carol", "password": "abc" }),
        json!({ "password": "pass1" }),
        json!({ "account_id": 5, "username": "carol", "password": "pass1" }),
    ] {
        let (status, _) = send(&app, Method::POST, "/register", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn message_lifecycle() {
    let app = app();
    let alice = register(&app, "alice", "pass1").await;

    let created = post_message(&app, alice, "first post").await;
    let id = created["message_id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(created["posted_by"].as_i64(), Some(alice));
    assert_eq!(created["time_posted_epoch"].as_i64(), Some(1669947792));

    let (status, body) = send(&app, Method::GET, &format!("/messages/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), created);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/messages/{id}"),
        Some(json!({ "message_text": "edited" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = json_of(&body);
    assert_eq!(updated["message_id"].as_i64(), Some(id));
    assert_eq!(updated["message_text"], "edited");

    let (status, body) = send(&app, Method::DELETE, &format!("/messages/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), updated);

    let (status, body) = send(&app, Method::GET, &format!("/messages/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, body) = send(&app, Method::DELETE, &format!("/messages/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn create_message_failures_are_bad_request() {
    let app = app();
    let alice = register(&app, "alice", "pass1").await;

    for body in [
        json!({ "posted_by": alice, "message_text": "   ", "time_posted_epoch": 1 }),
        json!({ "posted_by": alice, "message_text": "z".repeat(256), "time_posted_epoch": 1 }),
        json!({ "posted_by": alice + 50, "message_text": "hi", "time_posted_epoch": 1 }),
    ] {
        let (status, body) = send(&app, Method::POST, "/messages", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.is_empty());
    }

    let (_, body) = send(&app, Method::GET, "/messages", None).await;
    assert_eq!(json_of(&body), json!([]));
}

#[tokio::test]
async fn patch_failures_are_bad_request() {
    let app = app();
    let alice = register(&app, "alice", "pass1").await;
    let created = post_message(&app, alice, "original").await;
    let id = created["message_id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/messages/{id}"),
        Some(json!({ "message_text": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/messages/9999",
        Some(json!({ "message_text": "new text" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, &format!("/messages/{id}"), None).await;
    assert_eq!(json_of(&body), created);
}

#[tokio::test]
async fn lists_all_and_per_account() {
    let app = app();
    let alice = register(&app, "alice", "pass1").await;
    let bob = register(&app, "bob", "pass2").await;

    let a1 = post_message(&app, alice, "a1").await;
    let b1 = post_message(&app, bob, "b1").await;
    let a2 = post_message(&app, alice, "a2").await;

    let (status, body) = send(&app, Method::GET, "/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!([a1.clone(), b1, a2.clone()]));

    let (status, body) = send(&app, Method::GET, &format!("/accounts/{alice}/messages"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!([a1, a2]));

    let (_, body) = send(&app, Method::GET, "/accounts/777/messages", None).await;
    assert_eq!(json_of(&body), json!([]));
}

#[tokio::test]
async fn non_numeric_ids_are_bad_request() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/messages/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_of(&body), json!("Invalid message ID: abc"));

    let (status, _) = send(&app, Method::DELETE, "/messages/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/accounts/xyz/messages", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_of(&body), json!("Invalid account ID: xyz"));
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!({ "status": "ok" }));
}

#[tokio::test]
async fn undecodable_bodies_use_the_route_failure_status() {
    let app = app();
    let alice = register(&app, "alice", "pass1").await;
    let created = post_message(&app, alice, "original").await;
    let id = created["message_id"].as_i64().unwrap();
    let json = Some("application/json");

    let cases: Vec<(Method, String, Option<&str>, String, StatusCode)> = vec![
        (
            Method::POST,
            "/register".into(),
            json,
            r#"{"username":"bob","password":"pass1","email":"x"}"#.into(),
            StatusCode::BAD_REQUEST,
        ),
        (
            Method::POST,
            "/register".into(),
            json,
            r#"{"username":7,"password":"pass1"}"#.into(),
            StatusCode::BAD_REQUEST,
        ),
        (
            Method::POST,
            "/login".into(),
            None,
            r#"{"username":"alice","password":"pass1"}"#.into(),
            StatusCode::UNAUTHORIZED,
        ),
        (
            Method::POST,
            "/login".into(),
            json,
            "not json".into(),
            StatusCode::UNAUTHORIZED,
        ),
        (
            Method::POST,
            "/messages".into(),
            json,
            format!(r#"{{"posted_by":"{alice}","message_text":"hi"}}"#),
            StatusCode::BAD_REQUEST,
        ),
        (
            Method::PATCH,
            format!("/messages/{id}"),
            None,
            String::new(),
            StatusCode::BAD_REQUEST,
        ),
        (
            Method::PATCH,
            format!("/messages/{id}"),
            json,
            "{".into(),
            StatusCode::BAD_REQUEST,
        ),
    ];

    for (method, uri, content_type, body, expected) in cases {
        let (status, resp) = send_raw(&app, method.clone(), &uri, content_type, &body).await;
        assert_eq!(status, expected, "{method} {uri} with {body:?}");
        assert!(resp.is_empty(), "{method} {uri} answered with a body");
    }

    let (_, body) = send(&app, Method::GET, &format!("/messages/{id}"), None).await;
    assert_eq!(json_of(&body), created);
}

#[tokio::test]
async fn storage_failure_collapses_to_route_failure() {
    let (app, db) = app_with_db();
    let alice = register(&app, "alice", "pass1").await;
    db.with_conn(|c| Ok(c.execute_batch("DROP TABLE message")?)).unwrap();

    let (status, body) = send(&app, Method::GET, "/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!([]));

    let (status, body) = send(&app, Method::GET, &format!("/accounts/{alice}/messages"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/messages",
        Some(json!({ "posted_by": alice, "message_text": "hi", "time_posted_epoch": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/messages/1",
        Some(json!({ "message_text": "new text" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, "/messages/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn unicode_spacing_is_message_text() {
    let app = app();
    let alice = register(&app, "alice", "pass1").await;
    let created = post_message(&app, alice, "\u{3000}").await;
    assert_eq!(created["message_text"], "\u{3000}");
}
