//! HTTP-level tests for timetable management and the current-period lookup.

mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, delete_auth, get_auth, post_json_auth, put_json_auth, teacher_token};
use rollcall_core::clock::FixedClock;
use rollcall_core::types::DbId;
use serde_json::json;
use sqlx::PgPool;

fn period_body(teacher_id: DbId) -> serde_json::Value {
    json!({
        "day": "Monday",
        "periodNumber": 1,
        "subject": "Mathematics",
        "className": "CSE-A",
        "teacherId": teacher_id,
        "startTime": "09:00",
        "endTime": "10:00",
    })
}

async fn create_period(pool: &PgPool, token: &str, body: serde_json::Value) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(app, "/api/v1/timetable", body, token).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_period_with_default_color(pool: PgPool) {
    let (_, admin) = admin_token(&pool).await;
    let (teacher_id, _) = teacher_token(&pool, "t@test.com").await;

    let response = create_period(&pool, &admin, period_body(teacher_id)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let data = &body_json(response).await["data"];
    assert_eq!(data["day"], "Monday");
    assert_eq!(data["color"], "white");
    assert_eq!(data["teacherId"], teacher_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_period_validation(pool: PgPool) {
    let (_, admin) = admin_token(&pool).await;
    let (teacher_id, _) = teacher_token(&pool, "t@test.com").await;

    let mut bad_day = period_body(teacher_id);
    bad_day["day"] = json!("Funday");
    let mut backwards = period_body(teacher_id);
    backwards["startTime"] = json!("11:00");
    let mut bad_time = period_body(teacher_id);
    bad_time["endTime"] = json!("9:5");
    let mut zero_period = period_body(teacher_id);
    zero_period["periodNumber"] = json!(0);
    let unknown_teacher = period_body(9999);

    for body in [bad_day, backwards, bad_time, zero_period, unknown_teacher] {
        let response = create_period(&pool, &admin, body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_slot_conflicts(pool: PgPool) {
    let (_, admin) = admin_token(&pool).await;
    let (teacher_id, _) = teacher_token(&pool, "t@test.com").await;

    let first = create_period(&pool, &admin, period_body(teacher_id)).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = create_period(&pool, &admin, period_body(teacher_id)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_teacher_cannot_manage_timetable(pool: PgPool) {
    let (teacher_id, token) = teacher_token(&pool, "t@test.com").await;
    let response = create_period(&pool, &token, period_body(teacher_id)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_merges_before_validating(pool: PgPool) {
    let (_, admin) = admin_token(&pool).await;
    let (teacher_id, _) = teacher_token(&pool, "t@test.com").await;
    let created = body_json(create_period(&pool, &admin, period_body(teacher_id)).await).await;
    let uri = format!("/api/v1/timetable/{}", created["data"]["id"]);

    // 10:30 start against the stored 10:00 end runs backwards.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, json!({ "startTime": "10:30" }), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &uri,
        json!({ "startTime": "10:30", "endTime": "11:30", "color": "blue" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert_eq!(data["startTime"], "10:30");
    assert_eq!(data["color"], "blue");
    assert_eq!(data["subject"], "Mathematics");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_and_my_schedule(pool: PgPool) {
    let (_, admin) = admin_token(&pool).await;
    let (t1, t1_token) = teacher_token(&pool, "t1@test.com").await;
    let (t2, _) = teacher_token(&pool, "t2@test.com").await;
    create_period(&pool, &admin, period_body(t1)).await;
    create_period(&pool, &admin, period_body(t2)).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/timetable", &t1_token).await).await;
    let all = json["data"].as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0]["teacherName"].is_string());

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/timetable/my-schedule", &t1_token).await).await;
    let mine = json["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["teacherId"], t1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_current_period(pool: PgPool) {
    let (_, admin) = admin_token(&pool).await;
    let (teacher_id, token) = teacher_token(&pool, "t@test.com").await;
    create_period(&pool, &admin, period_body(teacher_id)).await;

    let app = common::build_test_app_at(pool.clone(), FixedClock::at(2024, 3, 4, 9, 30));
    let json = body_json(get_auth(app, "/api/v1/timetable/current-period", &token).await).await;
    assert_eq!(json["data"]["inPeriod"], true);
    assert_eq!(json["data"]["period"]["subject"], "Mathematics");

    // Tuesday at the same time.
    let app = common::build_test_app_at(pool, FixedClock::at(2024, 3, 5, 9, 30));
    let json = body_json(get_auth(app, "/api/v1/timetable/current-period", &token).await).await;
    assert_eq!(json["data"]["inPeriod"], false);
    assert!(json["data"]["period"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_period(pool: PgPool) {
    let (_, admin) = admin_token(&pool).await;
    let (teacher_id, _) = teacher_token(&pool, "t@test.com").await;
    let created = body_json(create_period(&pool, &admin, period_body(teacher_id)).await).await;
    let uri = format!("/api/v1/timetable/{}", created["data"]["id"]);

    let app = common::build_test_app(pool.clone());
    assert_eq!(delete_auth(app, &uri, &admin).await.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    assert_eq!(delete_auth(app, &uri, &admin).await.status(), StatusCode::NOT_FOUND);
}
