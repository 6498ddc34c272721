use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header::AUTHORIZATION, header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use models::role::Role;
use serde_json::{json, Value};
use service::auth::token;
use service::rate_limit::WindowLimiter;
use service::storage::MediaStore;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::auth::{AuthSettings, RateLimits, ServerState};
use server::routes;

const SECRET: &str = "integration-test-secret";

/// Build the real router against the test database; `None` skips the test
/// when no database is reachable.
async fn build_app() -> Option<Router> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match models::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    let media_root = std::env::temp_dir().join(format!("umkm_it_{}", Uuid::new_v4()));
    let state = ServerState {
        db,
        auth: AuthSettings { jwt_secret: SECRET.into(), token_ttl_days: 7 },
        media: MediaStore::new(media_root, "/uploads").await.ok()?,
        limits: RateLimits {
            global: Arc::new(WindowLimiter::new(10_000, Duration::from_secs(900))),
            login: Arc::new(WindowLimiter::new(20, Duration::from_secs(600))),
        },
        max_upload_bytes: 5 * 1024 * 1024,
    };
    Some(routes::build_router(CorsLayer::very_permissive(), state))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let Some(app) = build_app().await else {
        return;
    };

    let tag = Uuid::new_v4().simple().to_string()[..8].to_string();
    let username = format!("flow_{tag}");
    let email = format!("flow_{tag}@example.com");
    let register = json!({
        "username": username,
        "name": "Flow Tester",
        "email": email,
        "password": "S3curePass!",
    });

    // Register
    let resp = app.clone().oneshot(post_json("/auth/register", register.clone())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["username"], username.as_str());
    assert!(body["data"].get("password_hash").is_none());

    // Duplicate register conflicts
    let resp = app.clone().oneshot(post_json("/auth/register", register)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Login by username
    let resp = app
        .clone()
        .oneshot(post_json("/auth/login", json!({"username": username, "password": "S3curePass!"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let by_username = body_json(resp).await;
    assert_eq!(by_username["user"]["role"], "user");
    assert!(by_username["token"].as_str().is_some_and(|t| !t.is_empty()));

    // Login by email reaches the same account
    let resp = app
        .clone()
        .oneshot(post_json("/auth/login", json!({"email": email, "password": "S3curePass!"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let by_email = body_json(resp).await;
    assert_eq!(by_email["user"]["id"], by_username["user"]["id"]);

    // Wrong password and unknown identifier produce identical bodies
    let resp = app
        .clone()
        .oneshot(post_json("/auth/login", json!({"username": username, "password": "WrongPass1"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(resp).await;

    let resp = app
        .oneshot(post_json("/auth/login", json!({"username": format!("ghost_{tag}"), "password": "WrongPass1"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await, wrong_password);
}

#[tokio::test]
async fn photo_upload_round_trip() {
    let Some(app) = build_app().await else {
        return;
    };

    // A real user row to hang the photo on
    let tag = Uuid::new_v4().simple().to_string()[..8].to_string();
    let register = json!({
        "username": format!("photo_{tag}"),
        "name": "Photo Tester",
        "email": format!("photo_{tag}@example.com"),
        "password": "S3curePass!",
    });
    let resp = app.clone().oneshot(post_json("/auth/register", register)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user_id = body_json(resp).await["data"]["id"].as_i64().unwrap() as i32;

    let bearer = format!("Bearer {}", token::sign(SECRET, user_id, Role::User, 7).unwrap());
    let boundary = "umkm-test-boundary";
    let payload = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\nfake-png-bytes\r\n--{boundary}--\r\n"
    );

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users/me/photo")
                .header(AUTHORIZATION, &bearer)
                .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let url = body_json(resp).await["url"].as_str().unwrap().to_string();
    assert!(url.starts_with(&format!("/uploads/user-{user_id}/")));
    assert!(url.ends_with(".png"));

    // The stored object is served publicly
    let resp = app
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"fake-png-bytes");
}
