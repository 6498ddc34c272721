use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::middleware;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use common::types::Health;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{limit_global, limit_login, require_admin, require_auth, require_user, ServerState};
use crate::errors::JsonPanic;

pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod umkm;
pub mod users;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

/// Build the full application router: public, authenticated, and admin
/// routes, the uploads directory, and the middleware stack.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let uploads = ServeDir::new(state.media.root());
    let uploads_base = state.media.public_base().to_string();

    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/categories", get(categories::list))
        .route("/umkm", get(umkm::list))
        .route("/umkm/:id", get(umkm::detail))
        .route("/umkm/:id/comments", get(comments::list))
        .route("/auth/register", post(auth::register))
        .route(
            "/auth/login",
            post(auth::login)
                .layer(middleware::from_fn_with_state(state.clone(), limit_login)),
        );

    // Submissions come from regular users
    let user_routes = Router::new()
        .route("/umkm", post(umkm::create))
        .route_layer(middleware::from_fn(require_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Any authenticated caller
    let authed = Router::new()
        .route("/umkm/:id/comments", post(comments::create))
        .route(
            "/users/me/photo",
            post(users::upload_photo)
                .layer(DefaultBodyLimit::max(state.max_upload_bytes + 16 * 1024)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Admin routes
    let admin_routes = Router::new()
        .route("/categories", post(categories::create))
        .route("/umkm/admin/pending", get(umkm::pending))
        .route("/umkm/:id/activate", post(umkm::activate))
        .route("/admin/users/:id/role", patch(admin::update_role))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let swagger = SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi());

    // Compose
    public
        .merge(user_routes)
        .merge(authed)
        .merge(admin_routes)
        .merge(swagger)
        .nest_service(&uploads_base, uploads)
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, limit_global))
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .layer(CatchPanicLayer::custom(JsonPanic))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header::AUTHORIZATION, header::CONTENT_TYPE, Request, StatusCode};
    use models::role::Role;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::{json, Value};
    use service::auth::token;
    use service::rate_limit::WindowLimiter;
    use service::storage::MediaStore;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{AuthSettings, RateLimits};

    const SECRET: &str = "router-test-secret";

    async fn test_state(db: DatabaseConnection, login_max: u32) -> ServerState {
        let media_root = std::env::temp_dir().join(format!("umkm_router_{}", uuid::Uuid::new_v4()));
        ServerState {
            db,
            auth: AuthSettings { jwt_secret: SECRET.into(), token_ttl_days: 7 },
            media: MediaStore::new(media_root, "/uploads").await.unwrap(),
            limits: RateLimits {
                global: Arc::new(WindowLimiter::new(10_000, Duration::from_secs(60))),
                login: Arc::new(WindowLimiter::new(login_max, Duration::from_secs(60))),
            },
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }

    async fn app(db: DatabaseConnection, login_max: u32) -> Router {
        build_router(CorsLayer::new(), test_state(db, login_max).await)
    }

    fn empty_mock() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn bearer(role: Role) -> String {
        format!("Bearer {}", token::sign(SECRET, 1, role, 7).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"ok": true}));
    }

    #[tokio::test]
    async fn security_headers_are_set() {
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(resp.headers().get("referrer-policy").unwrap(), "no-referrer");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/categories")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"Kuliner"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await, json!({"error": "Missing Authorization header"}));
    }

    #[tokio::test]
    async fn garbage_tokens_are_rejected() {
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/umkm/admin/pending")
                    .header(AUTHORIZATION, "Bearer nonsense")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await, json!({"error": "Invalid or expired token"}));
    }

    #[tokio::test]
    async fn user_tokens_cannot_reach_admin_routes() {
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/umkm/admin/pending")
                    .header(AUTHORIZATION, bearer(Role::User))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp).await, json!({"error": "Forbidden"}));
    }

    #[tokio::test]
    async fn admin_tokens_pass_the_role_gate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<models::umkm::Model>::new()])
            .into_connection();
        let app = app(db, 20).await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/umkm/admin/pending")
                    .header(AUTHORIZATION, bearer(Role::Admin))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"data": []}));
    }

    #[tokio::test]
    async fn admin_tokens_are_not_plain_users() {
        // POST /umkm is for role user; an admin is turned away
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/umkm")
                    .header(AUTHORIZATION, bearer(Role::Admin))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn login_is_rate_limited_per_client() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<models::user::Model>::new()])
            .into_connection();
        let app = app(db, 1).await;

        let request = || {
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"ghost","password":"Passw0rd!"}"#))
                .unwrap()
        };

        // first request is admitted and fails credential lookup
        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(first).await, json!({"error": "Invalid credentials"}));

        // second request in the same window trips the limiter
        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(second).await, json!({"error": "Too many requests"}));
    }

    #[tokio::test]
    async fn invalid_register_payload_gets_details() {
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/register")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Invalid payload");
        assert!(body.get("details").is_some());
    }

    #[tokio::test]
    async fn comment_payload_must_carry_content_and_rating() {
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/umkm/1/comments")
                    .header(AUTHORIZATION, bearer(Role::User))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"content":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({"error": "content and rating are required"}));
    }

    #[tokio::test]
    async fn non_numeric_ids_are_rejected() {
        let app = app(empty_mock(), 20).await;
        let resp = app
            .oneshot(Request::builder().uri("/umkm/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({"error": "Invalid id"}));
    }
}
