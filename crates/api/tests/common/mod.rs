#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use rollcall_api::auth::jwt::{generate_access_token, JwtConfig};
use rollcall_api::auth::password::hash_password;
use rollcall_api::config::ServerConfig;
use rollcall_api::router::build_app_router;
use rollcall_api::state::AppState;
use rollcall_core::clock::{Clock, FixedClock};
use rollcall_core::types::DbId;
use rollcall_db::models::student::{CreateStudent, Student};
use rollcall_db::models::user::{CreateUser, User};
use rollcall_db::repositories::{StudentRepo, UserRepo};

/// Seeded role ids (see `20250101000002_create_users.sql`).
pub const ROLE_ADMIN_ID: DbId = 1;
pub const ROLE_TEACHER_ID: DbId = 2;

pub const TEST_PASSWORD: &str = "test_password_123";

/// Build a test `ServerConfig`: every default plus a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(
        |_| None,
        JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    )
}

/// Monday 2024-03-04, 09:30.
pub fn monday_0930() -> FixedClock {
    FixedClock::at(2024, 3, 4, 9, 30)
}

/// The production router over `pool`, with the clock frozen at [`monday_0930`].
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_at(pool, monday_0930())
}

pub fn build_test_app_at(pool: PgPool, clock: impl Clock + 'static) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock: Arc::new(clock),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and the given role id.
pub async fn create_user(pool: &PgPool, email: &str, role_id: DbId) -> User {
    let input = CreateUser {
        staff_id: None,
        name: format!("User {email}"),
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role_id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// A valid access token for `user_id` acting as `role`.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).expect("token should encode")
}

/// Create an admin user and return its id and token.
pub async fn admin_token(pool: &PgPool) -> (DbId, String) {
    let user = create_user(pool, "admin@test.com", ROLE_ADMIN_ID).await;
    (user.id, token_for(user.id, "admin"))
}

/// Create a teacher user and return its id and token.
pub async fn teacher_token(pool: &PgPool, email: &str) -> (DbId, String) {
    let user = create_user(pool, email, ROLE_TEACHER_ID).await;
    (user.id, token_for(user.id, "teacher"))
}

pub async fn add_student(pool: &PgPool, roll: &str, class_name: &str) -> Student {
    let input = CreateStudent {
        roll_number: roll.to_string(),
        name: format!("Student {roll}"),
        class_name: class_name.to_string(),
        course: None,
        year: None,
        branch: None,
    };
    StudentRepo::create(pool, &input)
        .await
        .expect("student creation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
